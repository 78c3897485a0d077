//! Marker-seeded region growing (watershed flooding).
//!
//! Seeds expand over a topographic surface in order of increasing height.
//! Where two regions meet, the contested pixel becomes a boundary.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ndarray::{Array2, ArrayView2};

use super::{BACKGROUND, BOUNDARY, UNKNOWN};
use crate::error::{ensure_same_dim, GrainError, Stage};

const NEIGHBORS_4: [(isize, isize); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Priority queue ordered by (height, insertion order).
///
/// The sequence number makes equal heights pop first-in first-out, which
/// keeps the flooding deterministic.
struct FloodQueue {
    heap: BinaryHeap<Reverse<(u8, u64, usize, usize)>>,
    seq: u64,
}

impl FloodQueue {
    fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }

    fn push(&mut self, height: u8, y: usize, x: usize) {
        self.heap.push(Reverse((height, self.seq, y, x)));
        self.seq += 1;
    }

    fn pop(&mut self) -> Option<(usize, usize)> {
        self.heap.pop().map(|Reverse((_, _, y, x))| (y, x))
    }
}

/// In-bounds 4-neighbors of `(y, x)`.
fn neighbors4(
    y: usize,
    x: usize,
    height: usize,
    width: usize,
) -> impl Iterator<Item = (usize, usize)> {
    NEIGHBORS_4.iter().filter_map(move |&(dx, dy)| {
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
            None
        } else {
            Some((ny as usize, nx as usize))
        }
    })
}

/// Grow seed labels over `surface` until every pixel is resolved.
///
/// # Arguments
/// * `surface` - Elevation map; low values flood first
/// * `markers` - Seed map: 0 = unknown, 1 = background, >= 2 = region seed
///
/// # Returns
/// A new label map with no unknown pixels left: region ids and background
/// keep their values, contested pixels are `BOUNDARY` (-1), pixels no seed
/// reaches become `BACKGROUND`.
pub fn grow_regions(
    surface: ArrayView2<u8>,
    markers: ArrayView2<i32>,
) -> Result<Array2<i32>, GrainError> {
    ensure_same_dim(Stage::RegionGrowing, "surface", markers.dim(), surface.dim())?;

    let (height, width) = markers.dim();
    let mut labels = markers.to_owned();
    let mut queued = Array2::<bool>::from_elem((height, width), false);
    let mut queue = FloodQueue::new();

    for y in 0..height {
        for x in 0..width {
            if labels[[y, x]] != UNKNOWN {
                continue;
            }
            if neighbors4(y, x, height, width).any(|(ny, nx)| labels[[ny, nx]] > UNKNOWN) {
                queued[[y, x]] = true;
                queue.push(surface[[y, x]], y, x);
            }
        }
    }

    while let Some((y, x)) = queue.pop() {
        let mut found = None;
        let mut contested = false;
        for (ny, nx) in neighbors4(y, x, height, width) {
            let l = labels[[ny, nx]];
            if l <= UNKNOWN {
                continue;
            }
            match found {
                None => found = Some(l),
                Some(f) if f != l => contested = true,
                Some(_) => {}
            }
        }

        let Some(label) = found else {
            return Err(GrainError::processing(
                Stage::RegionGrowing,
                format!("queued pixel ({x}, {y}) has no labeled neighbor"),
            ));
        };

        if contested {
            labels[[y, x]] = BOUNDARY;
            continue;
        }

        labels[[y, x]] = label;
        for (ny, nx) in neighbors4(y, x, height, width) {
            if labels[[ny, nx]] == UNKNOWN && !queued[[ny, nx]] {
                queued[[ny, nx]] = true;
                queue.push(surface[[ny, nx]], ny, nx);
            }
        }
    }

    let mut unreachable = 0usize;
    for l in labels.iter_mut() {
        if *l == UNKNOWN {
            *l = BACKGROUND;
            unreachable += 1;
        }
    }
    if unreachable > 0 {
        log::trace!("{unreachable} pixels unreachable from any seed resolved to background");
    }

    Ok(labels)
}

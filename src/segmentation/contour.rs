//! Outer contours of binary masks.
//!
//! Each 8-connected foreground component that is reachable from the image
//! frame (not nested inside a hole of another component) yields one closed
//! boundary, traced with the Moore neighborhood algorithm.
//!
//! Contours also provide polygon moments (shoelace formula) and a scanline
//! rasterization of the enclosed area.

use ndarray::{Array2, ArrayView2};

use super::labeling::{label_components, Connectivity};
use crate::filters::stylize::MASK_ON;

/// Moore neighborhood directions (8-connected, clockwise from right)
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),   // 0: right
    (1, 1),   // 1: down-right
    (0, 1),   // 2: down
    (-1, 1),  // 3: down-left
    (-1, 0),  // 4: left
    (-1, -1), // 5: up-left
    (0, -1),  // 6: up
    (1, -1),  // 7: up-right
];

/// Areas at or below this magnitude count as zero.
const AREA_EPSILON: f64 = 1e-12;

/// Closed outer boundary of one connected component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contour {
    /// Boundary pixels `(x, y)` in tracing order; the last point connects
    /// back to the first.
    pub points: Vec<(i32, i32)>,
}

/// Zeroth and first order polygon moments of a contour.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Moments {
    /// Signed area; the sign follows the winding direction.
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Enclosed area regardless of winding.
    pub fn area(&self) -> f64 {
        self.m00.abs()
    }

    /// Center of mass, `None` for degenerate (zero-area) polygons.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00.abs() <= AREA_EPSILON {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }
}

impl Contour {
    /// Polygon moments over the contour vertices.
    ///
    /// Contours with fewer than three points enclose nothing and return
    /// all-zero moments.
    pub fn moments(&self) -> Moments {
        let n = self.points.len();
        if n < 3 {
            return Moments::default();
        }

        let mut a = 0.0f64;
        let mut mx = 0.0f64;
        let mut my = 0.0f64;
        for i in 0..n {
            let (x0, y0) = self.points[i];
            let (x1, y1) = self.points[(i + 1) % n];
            let (x0, y0, x1, y1) = (x0 as f64, y0 as f64, x1 as f64, y1 as f64);
            let cross = x0 * y1 - x1 * y0;
            a += cross;
            mx += (x0 + x1) * cross;
            my += (y0 + y1) * cross;
        }

        Moments {
            m00: a * 0.5,
            m10: mx / 6.0,
            m01: my / 6.0,
        }
    }

    /// Pixels covered by the contour and its interior.
    ///
    /// The interior is rasterized with an even-odd scanline fill of the
    /// polygon; the boundary pixels themselves are always included. Pixels
    /// are clipped to `(height, width)` and returned as `[y, x]` array
    /// indices in raster order, without duplicates.
    pub fn fill(&self, height: usize, width: usize) -> Vec<(usize, usize)> {
        let inside: Vec<(i32, i32)> = self
            .points
            .iter()
            .copied()
            .filter(|&(x, y)| x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height)
            .collect();
        if inside.is_empty() {
            return Vec::new();
        }

        let min_x = inside.iter().map(|p| p.0).min().unwrap_or(0);
        let max_x = inside.iter().map(|p| p.0).max().unwrap_or(0);
        let min_y = inside.iter().map(|p| p.1).min().unwrap_or(0);
        let max_y = inside.iter().map(|p| p.1).max().unwrap_or(0);
        let box_w = (max_x - min_x + 1) as usize;
        let box_h = (max_y - min_y + 1) as usize;
        let mut covered = Array2::<bool>::from_elem((box_h, box_w), false);

        for &(x, y) in &inside {
            covered[[(y - min_y) as usize, (x - min_x) as usize]] = true;
        }

        let n = self.points.len();
        if n >= 3 {
            let mut crossings: Vec<f64> = Vec::new();
            for y in min_y..=max_y {
                crossings.clear();
                let yf = y as f64;
                for i in 0..n {
                    let (x0, y0) = self.points[i];
                    let (x1, y1) = self.points[(i + 1) % n];
                    if y0 == y1 {
                        continue;
                    }
                    let (lo, hi) = if y0 < y1 { (y0, y1) } else { (y1, y0) };
                    if y < lo || y >= hi {
                        continue;
                    }
                    let t = (yf - y0 as f64) / (y1 - y0) as f64;
                    crossings.push(x0 as f64 + t * (x1 - x0) as f64);
                }
                crossings.sort_by(|a, b| a.total_cmp(b));

                for pair in crossings.chunks_exact(2) {
                    let start = (pair[0].ceil() as i32).max(min_x);
                    let end = (pair[1].floor() as i32).min(max_x);
                    for x in start..=end {
                        covered[[(y - min_y) as usize, (x - min_x) as usize]] = true;
                    }
                }
            }
        }

        let mut pixels = Vec::new();
        for by in 0..box_h {
            for bx in 0..box_w {
                if covered[[by, bx]] {
                    pixels.push((by + min_y as usize, bx + min_x as usize));
                }
            }
        }
        pixels
    }
}

/// Mark background pixels connected to the image frame (4-connected).
fn frame_background(mask: ArrayView2<u8>) -> Array2<bool> {
    let (height, width) = mask.dim();
    let background = mask.mapv(|v| if v == 0 { MASK_ON } else { 0 });
    let holes = label_components(background.view(), Connectivity::Four);

    let mut reaches_frame = vec![false; holes.count + 1];
    for ((y, x), &l) in holes.labels.indexed_iter() {
        if l != 0 && (x == 0 || y == 0 || x + 1 == width || y + 1 == height) {
            reaches_frame[l as usize] = true;
        }
    }

    holes.labels.mapv(|l| l != 0 && reaches_frame[l as usize])
}

/// Trace the outer boundary of component `id` starting at its first raster pixel.
fn trace_boundary(labels: &Array2<u32>, id: u32, start: (i32, i32)) -> Vec<(i32, i32)> {
    let (height, width) = labels.dim();
    let is_member = |x: i32, y: i32| -> bool {
        x >= 0
            && y >= 0
            && (x as usize) < width
            && (y as usize) < height
            && labels[[y as usize, x as usize]] == id
    };
    // Next member clockwise after the backtrack direction
    let scan = |(x, y): (i32, i32), back: usize| -> Option<usize> {
        (1..=8)
            .map(|k| (back + k) % 8)
            .find(|&d| is_member(x + DIRECTIONS[d].0, y + DIRECTIONS[d].1))
    };

    // The start pixel is the first in raster order, so its left neighbor
    // is never a member.
    let Some(first) = scan(start, 4) else {
        return vec![start];
    };

    let mut contour = vec![start];
    let mut current = start;
    let mut back = 4usize;
    let max_steps = 4 * width * height + 8;
    let mut steps = 0usize;

    loop {
        let Some(dir) = scan(current, back) else {
            break;
        };
        // Jacob's criterion: leaving the start the same way as the first time
        if current == start && dir == first && steps > 0 {
            break;
        }
        current = (current.0 + DIRECTIONS[dir].0, current.1 + DIRECTIONS[dir].1);
        back = if dir % 2 == 0 { (dir + 6) % 8 } else { (dir + 5) % 8 };
        contour.push(current);

        steps += 1;
        if steps >= max_steps {
            log::warn!("contour tracing hit the step limit at {start:?}");
            break;
        }
    }

    if contour.len() > 1 && contour.last() == Some(&start) {
        contour.pop();
    }
    contour
}

/// Extract the outer contours of every 8-connected component of `mask`
/// that is not enclosed by a hole of another component.
///
/// # Arguments
/// * `mask` - Binary plane (non-zero = foreground)
///
/// # Returns
/// One contour per outer component, ordered by the raster position of the
/// component's first pixel
pub fn external_contours(mask: ArrayView2<u8>) -> Vec<Contour> {
    let (height, width) = mask.dim();
    if height == 0 || width == 0 {
        return Vec::new();
    }

    let components = label_components(mask, Connectivity::Eight);
    if components.count == 0 {
        return Vec::new();
    }
    let labels = &components.labels;
    let outside = frame_background(mask);

    let mut starts: Vec<Option<(i32, i32)>> = vec![None; components.count + 1];
    let mut external = vec![false; components.count + 1];

    for y in 0..height {
        for x in 0..width {
            let id = labels[[y, x]] as usize;
            if id == 0 {
                continue;
            }
            if starts[id].is_none() {
                starts[id] = Some((x as i32, y as i32));
            }
            if external[id] {
                continue;
            }
            let on_frame = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
            external[id] = on_frame
                || outside[[y - 1, x]]
                || outside[[y + 1, x]]
                || outside[[y, x - 1]]
                || outside[[y, x + 1]];
        }
    }

    (1..=components.count)
        .filter(|&id| external[id])
        .filter_map(|id| starts[id].map(|s| (id, s)))
        .map(|(id, start)| Contour {
            points: trace_boundary(labels, id as u32, start),
        })
        .collect()
}

//! Connected-component labeling using breadth-first flood fill.
//!
//! Components are numbered 1.. in the raster order of their first pixel
//! (top-to-bottom, left-to-right). Background pixels get label 0.

use std::collections::VecDeque;

use ndarray::{Array2, ArrayView2};

/// Pixel adjacency used when growing a component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connectivity {
    Four,
    Eight,
}

const NEIGHBORS_4: [(isize, isize); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];
const NEIGHBORS_8: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

impl Connectivity {
    /// `(dx, dy)` offsets of the neighborhood.
    pub fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            Connectivity::Four => &NEIGHBORS_4,
            Connectivity::Eight => &NEIGHBORS_8,
        }
    }
}

/// Labeled components of a mask.
pub struct Components {
    /// Per-pixel label, 0 = background.
    pub labels: Array2<u32>,
    /// Number of components; labels run from 1 to `count`.
    pub count: usize,
}

/// Label the connected non-zero regions of a mask.
///
/// # Arguments
/// * `mask` - Binary plane (non-zero = foreground)
/// * `connectivity` - Pixel adjacency
///
/// # Returns
/// Label map and component count
pub fn label_components(mask: ArrayView2<u8>, connectivity: Connectivity) -> Components {
    let (height, width) = mask.dim();
    let mut labels = Array2::<u32>::zeros((height, width));
    let mut count = 0usize;
    let mut queue = VecDeque::new();

    for y in 0..height {
        for x in 0..width {
            if mask[[y, x]] == 0 || labels[[y, x]] != 0 {
                continue;
            }

            count += 1;
            let id = count as u32;
            labels[[y, x]] = id;
            queue.push_back((x, y));

            while let Some((cx, cy)) = queue.pop_front() {
                for &(dx, dy) in connectivity.offsets() {
                    let nx = cx as isize + dx;
                    let ny = cy as isize + dy;
                    if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                        continue;
                    }
                    let (nx, ny) = (nx as usize, ny as usize);
                    if mask[[ny, nx]] != 0 && labels[[ny, nx]] == 0 {
                        labels[[ny, nx]] = id;
                        queue.push_back((nx, ny));
                    }
                }
            }
        }
    }

    Components { labels, count }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_empty_mask() {
        let mask = Array2::<u8>::zeros((4, 4));
        let c = label_components(mask.view(), Connectivity::Eight);
        assert_eq!(c.count, 0);
        assert!(c.labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn test_diagonal_touch_depends_on_connectivity() {
        let mask = array![[255u8, 0, 0], [0, 255, 0], [0, 0, 255]];

        let eight = label_components(mask.view(), Connectivity::Eight);
        assert_eq!(eight.count, 1);

        let four = label_components(mask.view(), Connectivity::Four);
        assert_eq!(four.count, 3);
        assert_eq!(four.labels[[2, 2]], 3);
    }

    #[test]
    fn test_raster_order_numbering() {
        // The right blob starts on an earlier row than the left one
        let mask = array![
            [0u8, 0, 0, 255],
            [255, 0, 0, 255],
            [255, 0, 0, 0],
        ];
        let c = label_components(mask.view(), Connectivity::Eight);
        assert_eq!(c.count, 2);
        assert_eq!(c.labels[[0, 3]], 1);
        assert_eq!(c.labels[[1, 0]], 2);
    }

    #[test]
    fn test_u_shape_is_one_component() {
        let mask = array![
            [255u8, 0, 255],
            [255, 0, 255],
            [255, 255, 255],
        ];
        let c = label_components(mask.view(), Connectivity::Four);
        assert_eq!(c.count, 1);
        assert_eq!(c.labels[[0, 2]], 1);
    }
}

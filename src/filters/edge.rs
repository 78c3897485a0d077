//! Edge detection filters: Sobel gradients, gradient magnitude, Canny.
//!
//! All functions operate on a single-channel plane (height, width). Border
//! pixels are handled by replicating the nearest in-image pixel.

use std::collections::VecDeque;

use ndarray::{Array2, ArrayView2};

/// Horizontal and vertical 3x3 Sobel responses.
pub struct Gradients {
    pub gx: Array2<i32>,
    pub gy: Array2<i32>,
}

// ============================================================================
// Sobel
// ============================================================================

/// Compute 3x3 Sobel derivatives of a plane with replicated borders.
///
/// `gx` grows to the right, `gy` grows downwards.
pub fn sobel_gradients(input: ArrayView2<u8>) -> Gradients {
    let (height, width) = input.dim();
    let mut gx = Array2::<i32>::zeros((height, width));
    let mut gy = Array2::<i32>::zeros((height, width));

    let kernel_h: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
    let kernel_v: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

    let clamp = |v: isize, n: usize| v.clamp(0, n as isize - 1) as usize;

    for y in 0..height {
        for x in 0..width {
            let mut sx = 0i32;
            let mut sy = 0i32;
            for ky in 0..3 {
                let py = clamp(y as isize + ky as isize - 1, height);
                for kx in 0..3 {
                    let px = clamp(x as isize + kx as isize - 1, width);
                    let v = input[[py, px]] as i32;
                    sx += v * kernel_h[ky][kx];
                    sy += v * kernel_v[ky][kx];
                }
            }
            gx[[y, x]] = sx;
            gy[[y, x]] = sy;
        }
    }

    Gradients { gx, gy }
}

/// Euclidean gradient magnitude saturated to u8.
///
/// Flat regions map to 0, boundaries between bright and dark regions to
/// high values. Used as the elevation surface for region growing.
pub fn gradient_magnitude_u8(input: ArrayView2<u8>) -> Array2<u8> {
    let Gradients { gx, gy } = sobel_gradients(input);
    let mut output = Array2::<u8>::zeros(input.dim());
    for ((out, &dx), &dy) in output.iter_mut().zip(gx.iter()).zip(gy.iter()) {
        let mag = ((dx * dx + dy * dy) as f32).sqrt();
        *out = mag.min(255.0) as u8;
    }
    output
}

// ============================================================================
// Canny
// ============================================================================

/// Canny edge detector with L1 gradient magnitude.
///
/// # Arguments
/// * `input` - Single-channel plane (height, width)
/// * `low` - Hysteresis low threshold; weaker pixels are never edges
/// * `high` - Hysteresis high threshold; stronger pixels seed edges
///
/// # Returns
/// Binary edge mask (0 or 255), one pixel thin
pub fn canny(input: ArrayView2<u8>, low: f32, high: f32) -> Array2<u8> {
    let (height, width) = input.dim();
    let mut output = Array2::<u8>::zeros((height, width));
    if height == 0 || width == 0 {
        return output;
    }

    let Gradients { gx, gy } = sobel_gradients(input);
    let mag = Array2::from_shape_fn((height, width), |(y, x)| {
        gx[[y, x]].abs() + gy[[y, x]].abs()
    });

    // Magnitude outside the image counts as zero
    let at = |y: isize, x: isize| -> i32 {
        if y < 0 || x < 0 || y >= height as isize || x >= width as isize {
            0
        } else {
            mag[[y as usize, x as usize]]
        }
    };

    let tan22 = 22.5f32.to_radians().tan();
    let tan67 = 67.5f32.to_radians().tan();

    // 0 = suppressed, 1 = candidate, 2 = strong
    let mut class = Array2::<u8>::zeros((height, width));
    let mut queue = VecDeque::new();

    for y in 0..height {
        for x in 0..width {
            let m = mag[[y, x]];
            if m as f32 <= low {
                continue;
            }
            let dx = gx[[y, x]];
            let dy = gy[[y, x]];
            let ax = dx.abs() as f32;
            let ay = dy.abs() as f32;
            let (yi, xi) = (y as isize, x as isize);

            let is_max = if ay < ax * tan22 {
                m > at(yi, xi - 1) && m >= at(yi, xi + 1)
            } else if ay > ax * tan67 {
                m > at(yi - 1, xi) && m >= at(yi + 1, xi)
            } else if (dx < 0) != (dy < 0) {
                m > at(yi - 1, xi + 1) && m >= at(yi + 1, xi - 1)
            } else {
                m > at(yi - 1, xi - 1) && m >= at(yi + 1, xi + 1)
            };

            if !is_max {
                continue;
            }
            if m as f32 > high {
                class[[y, x]] = 2;
                output[[y, x]] = 255;
                queue.push_back((y, x));
            } else {
                class[[y, x]] = 1;
            }
        }
    }

    // Hysteresis: grow strong edges through 8-connected candidates
    while let Some((y, x)) = queue.pop_front() {
        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                if dy == 0 && dx == 0 {
                    continue;
                }
                let ny = y as isize + dy;
                let nx = x as isize + dx;
                if ny < 0 || nx < 0 || ny >= height as isize || nx >= width as isize {
                    continue;
                }
                let (ny, nx) = (ny as usize, nx as usize);
                if class[[ny, nx]] == 1 {
                    class[[ny, nx]] = 2;
                    output[[ny, nx]] = 255;
                    queue.push_back((ny, nx));
                }
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_plane() -> Array2<u8> {
        Array2::from_shape_fn((7, 8), |(_, x)| if x < 4 { 0 } else { 200 })
    }

    #[test]
    fn test_sobel_detects_vertical_edge() {
        let g = sobel_gradients(step_plane().view());
        assert_eq!(g.gx[[3, 3]], 800);
        assert_eq!(g.gx[[3, 4]], 800);
        assert_eq!(g.gx[[3, 0]], 0);
        assert!(g.gy.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_sobel_replicates_border() {
        let flat = Array2::<u8>::from_elem((3, 3), 90);
        let g = sobel_gradients(flat.view());
        assert!(g.gx.iter().chain(g.gy.iter()).all(|&v| v == 0));
    }

    #[test]
    fn test_gradient_magnitude_saturates() {
        let mag = gradient_magnitude_u8(step_plane().view());
        assert_eq!(mag[[3, 3]], 255);
        assert_eq!(mag[[3, 0]], 0);
        assert_eq!(mag[[3, 7]], 0);
    }

    #[test]
    fn test_canny_thin_step_edge() {
        let edges = canny(step_plane().view(), 30.0, 200.0);
        for y in 0..7 {
            // Ties resolve to the left column of the plateau
            assert_eq!(edges[[y, 3]], 255, "row {y}");
            assert_eq!(edges[[y, 4]], 0, "row {y}");
        }
        assert_eq!(edges.iter().filter(|&&v| v > 0).count(), 7);
    }

    #[test]
    fn test_canny_flat_has_no_edges() {
        let flat = Array2::<u8>::from_elem((5, 5), 128);
        assert!(canny(flat.view(), 30.0, 200.0).iter().all(|&v| v == 0));
    }

    #[test]
    fn test_canny_weak_edge_needs_strong_seed() {
        // Step of 40 gives L1 magnitude 160: above low, below high
        let weak = Array2::from_shape_fn((5, 6), |(_, x)| if x < 3 { 0 } else { 40 });
        assert!(canny(weak.view(), 30.0, 200.0).iter().all(|&v| v == 0));
        assert!(canny(weak.view(), 30.0, 150.0).iter().any(|&v| v > 0));
    }
}

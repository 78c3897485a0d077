//! Morphology filters: Dilate, Erode, Open.
//!
//! Binary-mask morphology with a square `k x k` structuring element. The
//! square kernel is separable, so every pass runs as a horizontal sweep
//! followed by a vertical sweep.
//!
//! Neighbors outside the image are ignored: border pixels erode only
//! through in-image zeros and dilate only from in-image ones.

use ndarray::{Array2, ArrayView2};

/// Offsets covered by a kernel of `size` anchored at its center.
///
/// Even sizes extend one further to the positive side.
fn kernel_span(size: usize) -> (isize, isize) {
    let lo = -((size / 2) as isize);
    let hi = size as isize - 1 + lo;
    (lo, hi)
}

#[derive(Clone, Copy)]
enum Op {
    Min,
    Max,
}

impl Op {
    fn identity(self) -> u8 {
        match self {
            Op::Min => u8::MAX,
            Op::Max => u8::MIN,
        }
    }

    fn apply(self, a: u8, b: u8) -> u8 {
        match self {
            Op::Min => a.min(b),
            Op::Max => a.max(b),
        }
    }
}

/// One separable min/max pass.
fn rank_pass(input: ArrayView2<u8>, size: usize, op: Op) -> Array2<u8> {
    let (height, width) = input.dim();
    let (lo, hi) = kernel_span(size);

    // Horizontal
    let mut rows = Array2::<u8>::zeros((height, width));
    for y in 0..height {
        for x in 0..width {
            let mut acc = op.identity();
            for dx in lo..=hi {
                let sx = x as isize + dx;
                if sx < 0 || sx >= width as isize {
                    continue;
                }
                acc = op.apply(acc, input[[y, sx as usize]]);
            }
            rows[[y, x]] = acc;
        }
    }

    // Vertical
    let mut output = Array2::<u8>::zeros((height, width));
    for y in 0..height {
        for x in 0..width {
            let mut acc = op.identity();
            for dy in lo..=hi {
                let sy = y as isize + dy;
                if sy < 0 || sy >= height as isize {
                    continue;
                }
                acc = op.apply(acc, rows[[sy as usize, x]]);
            }
            output[[y, x]] = acc;
        }
    }

    output
}

fn repeat(input: ArrayView2<u8>, size: usize, iterations: usize, op: Op) -> Array2<u8> {
    let mut current = input.to_owned();
    for _ in 0..iterations {
        current = rank_pass(current.view(), size, op);
    }
    current
}

// ============================================================================
// Erode
// ============================================================================

/// Erode a mask with a square kernel.
///
/// # Arguments
/// * `input` - Single-channel plane (height, width)
/// * `size` - Side length of the square structuring element
/// * `iterations` - Number of successive erosions
///
/// # Returns
/// Eroded plane of the same shape
pub fn erode_rect(input: ArrayView2<u8>, size: usize, iterations: usize) -> Array2<u8> {
    repeat(input, size, iterations, Op::Min)
}

// ============================================================================
// Dilate
// ============================================================================

/// Dilate a mask with a square kernel.
///
/// # Arguments
/// * `input` - Single-channel plane (height, width)
/// * `size` - Side length of the square structuring element
/// * `iterations` - Number of successive dilations
///
/// # Returns
/// Dilated plane of the same shape
pub fn dilate_rect(input: ArrayView2<u8>, size: usize, iterations: usize) -> Array2<u8> {
    repeat(input, size, iterations, Op::Max)
}

// ============================================================================
// Open
// ============================================================================

/// Morphological opening: `iterations` erosions followed by as many dilations.
///
/// Removes specks smaller than the eroded footprint while restoring the
/// outline of everything that survives.
pub fn open_rect(input: ArrayView2<u8>, size: usize, iterations: usize) -> Array2<u8> {
    let eroded = erode_rect(input, size, iterations);
    dilate_rect(eroded.view(), size, iterations)
}

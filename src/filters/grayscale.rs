//! Grayscale (luma) conversion.
//!
//! Produces a single-channel `Array2<u8>` plane from 1, 3 or 4 channel
//! input. Single-channel input is copied through unchanged; RGB(A) input is
//! reduced with configurable channel weights, alpha is ignored.

use ndarray::{Array2, ArrayView3};

/// RGB channel weights used for luma reduction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrayscaleWeights {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl GrayscaleWeights {
    /// ITU-R BT.601 weights (the classic `0.299 R + 0.587 G + 0.114 B`).
    pub const BT601: Self = Self {
        r: 0.299,
        g: 0.587,
        b: 0.114,
    };
}

impl Default for GrayscaleWeights {
    fn default() -> Self {
        Self::BT601
    }
}

/// Reduce an image to a rounded luma plane.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `weights` - Channel weights (ignored for single-channel input)
///
/// # Returns
/// Luma plane of shape (height, width)
pub fn luma_u8(input: ArrayView3<u8>, weights: GrayscaleWeights) -> Array2<u8> {
    let (height, width, channels) = input.dim();
    let mut output = Array2::<u8>::zeros((height, width));

    for y in 0..height {
        for x in 0..width {
            output[[y, x]] = if channels < 3 {
                input[[y, x, 0]]
            } else {
                let r = input[[y, x, 0]] as f32;
                let g = input[[y, x, 1]] as f32;
                let b = input[[y, x, 2]] as f32;
                (weights.r * r + weights.g * g + weights.b * b)
                    .round()
                    .clamp(0.0, 255.0) as u8
            };
        }
    }

    output
}

/// Replicate a single-channel plane or drop alpha so the result is always RGB.
pub fn to_rgb_u8(input: ArrayView3<u8>) -> ndarray::Array3<u8> {
    let (height, width, channels) = input.dim();
    let mut output = ndarray::Array3::<u8>::zeros((height, width, 3));

    for y in 0..height {
        for x in 0..width {
            for c in 0..3 {
                output[[y, x, c]] = if channels < 3 {
                    input[[y, x, 0]]
                } else {
                    input[[y, x, c]]
                };
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_luma_bt601() {
        let mut img = Array3::<u8>::zeros((1, 3, 3));
        img[[0, 0, 0]] = 230;
        img[[0, 1, 2]] = 230;
        for c in 0..3 {
            img[[0, 2, c]] = 230;
        }

        let luma = luma_u8(img.view(), GrayscaleWeights::BT601);

        assert_eq!(luma[[0, 0]], 69); // 0.299 * 230 = 68.77
        assert_eq!(luma[[0, 1]], 26); // 0.114 * 230 = 26.22
        assert_eq!(luma[[0, 2]], 230);
    }

    #[test]
    fn test_luma_single_channel_passthrough() {
        let mut img = Array3::<u8>::zeros((2, 2, 1));
        img[[1, 0, 0]] = 42;

        let luma = luma_u8(img.view(), GrayscaleWeights::default());

        assert_eq!(luma[[1, 0]], 42);
        assert_eq!(luma[[0, 0]], 0);
    }

    #[test]
    fn test_to_rgb_replicates_gray_and_drops_alpha() {
        let mut gray = Array3::<u8>::zeros((1, 1, 1));
        gray[[0, 0, 0]] = 9;
        let rgb = to_rgb_u8(gray.view());
        assert_eq!(rgb.dim(), (1, 1, 3));
        assert_eq!((rgb[[0, 0, 0]], rgb[[0, 0, 1]], rgb[[0, 0, 2]]), (9, 9, 9));

        let mut rgba = Array3::<u8>::zeros((1, 1, 4));
        rgba[[0, 0, 1]] = 5;
        rgba[[0, 0, 3]] = 255;
        let rgb = to_rgb_u8(rgba.view());
        assert_eq!(rgb.dim(), (1, 1, 3));
        assert_eq!(rgb[[0, 0, 1]], 5);
    }
}

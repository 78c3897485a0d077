//! Color adjustment: linear contrast/brightness.
//!
//! Pixel-wise operation without spatial context.
//!
//! ## Supported Formats
//!
//! Accepts images with 1, 3, or 4 channels:
//! - **Grayscale**: (height, width, 1) - single luminance channel
//! - **RGB**: (height, width, 3) - red, green, blue
//! - **RGBA**: (height, width, 4) - red, green, blue, alpha
//!
//! Alpha channel (if present) is always preserved unchanged.

use ndarray::{Array3, ArrayView3};

// ============================================================================
// Linear adjust
// ============================================================================

/// Scale and offset every color channel: `out = saturate(round(contrast * in + brightness))`.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `contrast` - Multiplicative gain (1.0 = unchanged)
/// * `brightness` - Additive offset in 0-255 units (0.0 = unchanged)
///
/// # Returns
/// Adjusted image with same channel count
pub fn linear_adjust_u8(input: ArrayView3<u8>, contrast: f32, brightness: f32) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, channels));

    let color_channels = if channels == 4 { 3 } else { channels };

    for y in 0..height {
        for x in 0..width {
            for c in 0..color_channels {
                let v = contrast * input[[y, x, c]] as f32 + brightness;
                output[[y, x, c]] = v.round().clamp(0.0, 255.0) as u8;
            }
            if channels == 4 {
                output[[y, x, 3]] = input[[y, x, 3]];
            }
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_adjust_scales_and_offsets() {
        let mut img = Array3::<u8>::zeros((1, 3, 3));
        img[[0, 0, 0]] = 100;
        img[[0, 1, 1]] = 255;
        img[[0, 2, 2]] = 127;

        let result = linear_adjust_u8(img.view(), 0.6, 6.0);

        assert_eq!(result[[0, 0, 0]], 66);
        assert_eq!(result[[0, 1, 1]], 159);
        // 0.6 * 127 + 6 = 82.2 rounds down
        assert_eq!(result[[0, 2, 2]], 82);
        // Zero channels only receive the offset
        assert_eq!(result[[0, 0, 1]], 6);
    }

    #[test]
    fn test_linear_adjust_saturates() {
        let mut img = Array3::<u8>::zeros((1, 2, 1));
        img[[0, 0, 0]] = 200;

        let bright = linear_adjust_u8(img.view(), 2.0, 10.0);
        assert_eq!(bright[[0, 0, 0]], 255);

        let dark = linear_adjust_u8(img.view(), 1.0, -50.0);
        assert_eq!(dark[[0, 1, 0]], 0);
    }

    #[test]
    fn test_linear_adjust_preserves_alpha() {
        let mut img = Array3::<u8>::zeros((2, 2, 4));
        img[[1, 1, 3]] = 77;

        let result = linear_adjust_u8(img.view(), 0.6, 6.0);

        assert_eq!(result[[1, 1, 3]], 77);
        assert_eq!(result[[1, 1, 0]], 6);
    }
}

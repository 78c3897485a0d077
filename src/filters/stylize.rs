//! Threshold filters.
//!
//! - `threshold_channels_u8` thresholds every color channel independently
//!   (the coarse color mask).
//! - `binarize_u8` turns a single-channel plane into a strict 0/255 mask.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};

/// Value of a set pixel in every binary mask of the crate.
pub const MASK_ON: u8 = 255;

/// Apply a per-channel binary threshold - u8 version.
///
/// Every color channel strictly above `cutoff` becomes `value`, everything
/// else becomes 0. Alpha (if present) is preserved.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `cutoff` - Threshold value (0-255)
/// * `value` - Output value for channels above the cutoff
///
/// # Returns
/// Thresholded image with same channel count
pub fn threshold_channels_u8(input: ArrayView3<u8>, cutoff: u8, value: u8) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, channels));

    let color_channels = if channels == 4 { 3 } else { channels };

    for y in 0..height {
        for x in 0..width {
            for c in 0..color_channels {
                output[[y, x, c]] = if input[[y, x, c]] > cutoff { value } else { 0 };
            }
            if channels == 4 {
                output[[y, x, 3]] = input[[y, x, 3]];
            }
        }
    }
    output
}

/// Binarize a single-channel plane: values above `cutoff` become 255.
pub fn binarize_u8(input: ArrayView2<u8>, cutoff: u8) -> Array2<u8> {
    input.mapv(|v| if v > cutoff { MASK_ON } else { 0 })
}

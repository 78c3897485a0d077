//! Filter modules used by the grain pipeline.
//!
//! ## Supported Formats
//!
//! Color filters accept images with 1, 3, or 4 channels:
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | Grayscale8 | (H, W, 1) | u8 | Single luminance channel, 0-255 |
//! | RGB8 | (H, W, 3) | u8 | Red, green, blue, 0-255 |
//! | RGBA8 | (H, W, 4) | u8 | RGB + alpha, 0-255 |
//!
//! Channel count is inferred from input array dimensions. Alpha (if present)
//! is preserved by color filters and ignored by luma reduction.
//!
//! Mask and plane filters work on single-channel `(H, W)` arrays.
//!
//! ## Filter Categories
//!
//! - **Pixel-wise**: linear contrast/brightness (`color_adjust`)
//! - **Luma**: weighted grayscale reduction (`grayscale`)
//! - **Threshold**: per-channel threshold, binarize (`stylize`)
//! - **Morphology**: square-kernel erode, dilate, open (`morphology`)
//! - **Distance**: exact Euclidean distance transform (`distance`)
//! - **Edge detection**: Sobel, gradient magnitude, Canny (`edge`)

pub mod color_adjust;
pub mod distance;
pub mod edge;
pub mod grayscale;
pub mod morphology;
pub mod stylize;

//! Overlay drawing for the annotated result image.
//!
//! All drawing happens on an owned RGB canvas `(height, width, 3)` and is
//! clipped to the canvas bounds.

pub mod font;

use ndarray::{Array3, ArrayView2, ArrayView3};

use crate::filters::grayscale::to_rgb_u8;
use crate::segmentation::{Contour, BOUNDARY};

pub const GREEN: [u8; 3] = [0, 255, 0];
pub const RED: [u8; 3] = [255, 0, 0];
pub const WHITE: [u8; 3] = [255, 255, 255];

/// Outline thickness of grain contours in pixels.
pub const CONTOUR_THICKNESS: i32 = 2;

/// RGB copy of the input to draw on.
pub fn base_canvas(image: ArrayView3<u8>) -> Array3<u8> {
    to_rgb_u8(image)
}

#[inline]
fn put(canvas: &mut Array3<u8>, x: i32, y: i32, color: [u8; 3]) {
    let (height, width, _) = canvas.dim();
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }
    for (c, &v) in color.iter().enumerate() {
        canvas[[y as usize, x as usize, c]] = v;
    }
}

/// Paint every region-growing boundary pixel.
pub fn paint_boundaries(canvas: &mut Array3<u8>, labels: ArrayView2<i32>, color: [u8; 3]) {
    for ((y, x), &l) in labels.indexed_iter() {
        if l == BOUNDARY {
            put(canvas, x as i32, y as i32, color);
        }
    }
}

/// Draw a closed contour with a square pen of `thickness` pixels.
///
/// Consecutive contour points are 8-adjacent, so stamping every point
/// yields a connected outline.
pub fn draw_contour(canvas: &mut Array3<u8>, contour: &Contour, color: [u8; 3], thickness: i32) {
    let t = thickness.max(1);
    let lo = -(t / 2);
    let hi = t - 1 + lo;
    for &(x, y) in &contour.points {
        for dy in lo..=hi {
            for dx in lo..=hi {
                put(canvas, x + dx, y + dy, color);
            }
        }
    }
}

/// Draw `text` with its baseline-left corner at `origin`.
pub fn draw_label(
    canvas: &mut Array3<u8>,
    text: &str,
    origin: (i32, i32),
    scale: f32,
    color: [u8; 3],
) {
    font::draw_text(canvas, text, origin, scale, color);
}

/// Headline text for a total count.
pub fn headline_text(total: usize) -> String {
    format!("Total Rice Grains: {total}")
}

/// Pixel box `(x, y, width, height)` covered by the headline.
pub fn headline_box(
    image_width: usize,
    total: usize,
    font_scale_per_px: f32,
) -> (i32, i32, i32, i32) {
    let scale = image_width as f32 * font_scale_per_px;
    let (w, h) = font::measure(&headline_text(total), scale);
    let x = (image_width as i32 - w) / 2;
    let baseline = 50 + h;
    (x, baseline - h, w, h)
}

/// Draw the centered count headline at the top of the canvas.
///
/// The font scale grows with the image width; the baseline sits at
/// `50 + text height`.
pub fn draw_headline(
    canvas: &mut Array3<u8>,
    total: usize,
    font_scale_per_px: f32,
    color: [u8; 3],
) {
    let (_, width, _) = canvas.dim();
    let scale = width as f32 * font_scale_per_px;
    let (x, top, _, h) = headline_box(width, total, font_scale_per_px);
    font::draw_text(canvas, &headline_text(total), (x, top + h), scale, color);
}

//! Minimal 5x7 bitmap font for overlay text.
//!
//! Covers digits, a few punctuation marks and the letters of the count
//! headline. Characters without a glyph advance the pen but draw nothing.
//! Glyphs are scaled by an integer pixel size and anchored at the
//! bottom-left of the text (baseline origin).

use ndarray::Array3;

const GLYPH_W: i32 = 5;
const GLYPH_H: i32 = 7;
/// Horizontal advance per character in glyph cells (glyph + 1 gap).
const ADVANCE: i32 = GLYPH_W + 1;

/// Rows of a glyph, most significant of the low 5 bits = leftmost column.
type Glyph = [u8; 7];

fn glyph(c: char) -> Option<Glyph> {
    let rows = match c {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'a' => [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111],
        'c' => [0b00000, 0b00000, 0b01110, 0b10000, 0b10000, 0b10001, 0b01110],
        'e' => [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110],
        'i' => [0b00100, 0b00000, 0b01100, 0b00100, 0b00100, 0b00100, 0b01110],
        'l' => [0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'n' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        'o' => [0b00000, 0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
        'r' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000],
        's' => [0b00000, 0b00000, 0b01110, 0b10000, 0b01110, 0b00001, 0b11110],
        't' => [0b01000, 0b01000, 0b11100, 0b01000, 0b01000, 0b01001, 0b00110],
        _ => return None,
    };
    Some(rows)
}

/// Integer pixel size of one glyph cell for a font scale.
///
/// Scale 1.0 gives 21 px tall glyphs; every scale draws at least 1 px.
pub fn pixel_size(scale: f32) -> i32 {
    ((scale * 3.0).round() as i32).max(1)
}

/// Size `(width, height)` in pixels of `text` rendered at `scale`.
pub fn measure(text: &str, scale: f32) -> (i32, i32) {
    let s = pixel_size(scale);
    let chars = text.chars().count() as i32;
    let width = if chars == 0 {
        0
    } else {
        (chars * ADVANCE - 1) * s
    };
    (width, GLYPH_H * s)
}

/// Draw `text` with its bottom-left corner at `origin` `(x, y)`.
///
/// Pixels outside the canvas are clipped.
pub fn draw_text(
    canvas: &mut Array3<u8>,
    text: &str,
    origin: (i32, i32),
    scale: f32,
    color: [u8; 3],
) {
    let (height, width, _) = canvas.dim();
    let s = pixel_size(scale);
    let top = origin.1 - GLYPH_H * s;

    for (i, c) in text.chars().enumerate() {
        let Some(rows) = glyph(c) else {
            continue;
        };
        let left = origin.0 + i as i32 * ADVANCE * s;

        for (gy, bits) in rows.iter().enumerate() {
            for gx in 0..GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - gx)) == 0 {
                    continue;
                }
                let px0 = left + gx * s;
                let py0 = top + gy as i32 * s;
                for py in py0..py0 + s {
                    if py < 0 || py >= height as i32 {
                        continue;
                    }
                    for px in px0..px0 + s {
                        if px < 0 || px >= width as i32 {
                            continue;
                        }
                        for (ch, &v) in color.iter().enumerate() {
                            canvas[[py as usize, px as usize, ch]] = v;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_size() {
        assert_eq!(pixel_size(1.5), 5);
        assert_eq!(pixel_size(1.0), 3);
        assert_eq!(pixel_size(0.1), 1);
    }

    #[test]
    fn test_measure() {
        assert_eq!(measure("12", 1.0), (33, 21));
        assert_eq!(measure("", 1.0), (0, 21));
    }

    #[test]
    fn test_draw_one_at_scale_one() {
        let mut canvas = Array3::<u8>::zeros((10, 10, 3));
        draw_text(&mut canvas, "1", (0, 7), 0.3, [255, 0, 0]);

        // Top row of '1' has only the center column set
        assert_eq!(canvas[[0, 2, 0]], 255);
        assert_eq!(canvas[[0, 1, 0]], 0);
        // Bottom row is the serif
        assert_eq!(canvas[[6, 1, 0]], 255);
        assert_eq!(canvas[[6, 3, 0]], 255);
        // Nothing below the baseline
        assert!((0..10).all(|x| canvas[[7, x, 0]] == 0));
        assert_eq!(canvas[[0, 2, 1]], 0);
    }

    #[test]
    fn test_draw_is_clipped() {
        let mut canvas = Array3::<u8>::zeros((4, 4, 3));
        draw_text(&mut canvas, "88", (-3, 2), 1.0, [255, 255, 255]);
        draw_text(&mut canvas, "8", (100, 100), 1.0, [255, 255, 255]);
    }

    #[test]
    fn test_unknown_chars_draw_nothing() {
        let mut canvas = Array3::<u8>::zeros((10, 20, 3));
        draw_text(&mut canvas, "#?", (0, 8), 0.3, [255, 255, 255]);
        assert!(canvas.iter().all(|&v| v == 0));
    }
}

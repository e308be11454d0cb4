// A built-in 5x7 bitmap font, rasterized straight into a frame. Glyph
// rows are 5-bit masks, bit 4 leftmost. Covers the letters the labels
// need; anything else renders as a filled block. Drawing clips at the
// frame edge instead of failing.

use crate::core_modules::factory::Frame;
use crate::core_modules::palette::Color;
use image::Rgb;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
/// One blank column between glyphs, pre-scaling.
const GLYPH_SPACING: u32 = 1;

/// Draws `text` with its top-left corner at (x, y), scaled up by `scale`.
pub fn draw_text(frame: &mut Frame, x: u32, y: u32, text: &str, color: Color, scale: u32) {
    let mut cursor = x;
    for c in text.chars() {
        draw_glyph(frame, cursor, y, c, color, scale);
        cursor += (GLYPH_WIDTH + GLYPH_SPACING) * scale;
    }
}

/// The (width, height) in pixels that `draw_text` will cover.
fn text_extent(text: &str, scale: u32) -> (u32, u32) {
    let chars = text.chars().count() as u32;
    (chars * (GLYPH_WIDTH + GLYPH_SPACING) * scale, GLYPH_HEIGHT * scale)
}

fn draw_glyph(frame: &mut Frame, x: u32, y: u32, c: char, color: Color, scale: u32) {
    let rows = glyph_rows(c);
    let pixel = Rgb::from(color);
    let (frame_w, frame_h) = frame.dimensions();
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = x + col * scale + dx;
                    let py = y + row as u32 * scale + dy;
                    if px < frame_w && py < frame_h {
                        frame.put_pixel(px, py, pixel);
                    }
                }
            }
        }
    }
}

fn glyph_rows(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0E],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        ' ' => [0x00; 7],
        _ => [0x1F; 7],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::factory::solid;

    #[test]
    fn extent_accounts_for_scale_and_spacing() {
        assert_eq!(text_extent("red", 1), (18, 7));
        assert_eq!(text_extent("red", 2), (36, 14));
    }

    #[test]
    fn drawing_touches_only_the_text_region() {
        let base = Color::new(0, 0, 255);
        let ink = Color::new(128, 128, 128);
        let mut frame = solid(50, 80, base);
        draw_text(&mut frame, 4, 6, "blue", ink, 2);

        let (w, h) = text_extent("blue", 2);
        let mut inked = 0;
        for (x, y, pixel) in frame.enumerate_pixels() {
            let inside = x >= 4 && x < 4 + w && y >= 6 && y < 6 + h;
            if !inside {
                assert_eq!(Color::from(*pixel), base, "stray ink at ({x}, {y})");
            } else if Color::from(*pixel) == ink {
                inked += 1;
            }
        }
        assert!(inked > 0, "no glyph pixels were drawn");
    }

    #[test]
    fn clips_instead_of_panicking_near_the_edge() {
        let mut frame = solid(8, 8, Color::new(0, 0, 0));
        draw_text(&mut frame, 6, 6, "white", Color::new(128, 128, 128), 3);
    }
}

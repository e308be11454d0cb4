// THEORY:
// The `annotator` is the transform at the heart of the Compositor stage,
// split into small, separately testable pieces. `detect_color` reads a
// single fixed interior sample point; it is only meaningful for frames
// known to be solid, and on anything else reports whatever the sampled
// pixel holds. The geometry helpers are pure integer math, kept free of
// drawing so the formulas can be asserted directly. `annotate`
// overwrites exactly two regions (the label text and the filled circle)
// and nothing else; both clip at the frame boundary, so a radius larger
// than a short frame's height is fine.

use crate::core_modules::factory::Frame;
use crate::core_modules::font;
use crate::core_modules::palette::Color;
use image::Rgb;

/// Fixed interior sample point, clamped into bounds for tiny frames.
const SAMPLE_X: u32 = 3;
const SAMPLE_Y: u32 = 4;

/// The label is drawn at a fixed top-left offset in a muted gray.
const LABEL_ORIGIN: (u32, u32) = (4, 6);
const LABEL_COLOR: Color = Color {
    red: 128,
    green: 128,
    blue: 128,
};
const LABEL_SCALE: u32 = 2;

/// Circle radius as a fraction of frame width.
const CIRCLE_RATIO: f64 = 0.25;

/// Reads the fixed sample point and reports it as the frame's color.
/// Only valid for solid frames.
pub fn detect_color(frame: &Frame) -> Color {
    let x = SAMPLE_X.min(frame.width() - 1);
    let y = SAMPLE_Y.min(frame.height() - 1);
    Color::from(*frame.get_pixel(x, y))
}

/// floor(width * 0.25). May exceed the frame's height for wide frames;
/// circle drawing clips rather than failing.
pub fn circle_radius(frame: &Frame) -> u32 {
    (f64::from(frame.width()) * CIRCLE_RATIO) as u32
}

/// The (x, y) center of a height-by-width frame.
pub fn center_of(height: u32, width: u32) -> (u32, u32) {
    (width / 2, height / 2)
}

/// Overlays the label at the fixed top-left offset and a filled circle of
/// `circle_color` at the frame center. Pixels outside those two regions
/// are left untouched.
pub fn annotate(frame: &mut Frame, label: &str, circle_color: Color) {
    font::draw_text(
        frame,
        LABEL_ORIGIN.0,
        LABEL_ORIGIN.1,
        label,
        LABEL_COLOR,
        LABEL_SCALE,
    );
    let (cx, cy) = center_of(frame.height(), frame.width());
    fill_circle(frame, cx, cy, circle_radius(frame), circle_color);
}

/// Scanline fill, clipped at the frame edges.
fn fill_circle(frame: &mut Frame, cx: u32, cy: u32, radius: u32, color: Color) {
    let pixel = Rgb::from(color);
    let (width, height) = frame.dimensions();
    let (cx, cy, r) = (i64::from(cx), i64::from(cy), i64::from(radius));
    for dy in -r..=r {
        let y = cy + dy;
        if y < 0 || y >= i64::from(height) {
            continue;
        }
        let half_span = ((r * r - dy * dy) as f64).sqrt() as i64;
        let x_start = (cx - half_span).max(0);
        let x_end = (cx + half_span).min(i64::from(width) - 1);
        for x in x_start..=x_end {
            frame.put_pixel(x as u32, y as u32, pixel);
        }
    }
}

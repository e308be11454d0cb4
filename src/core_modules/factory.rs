// THEORY:
// The `factory` module is the pipeline's only source of new frames. A
// `Frame` is the unit of hand-off for the whole system: the Generator
// builds one here and from then on exactly one stage owns it at a time,
// so downstream code can assume its dimensions were validated up front.

use crate::core_modules::palette::Color;
use image::{Rgb, RgbImage};

/// One image moving through the pipeline: a rectangular RGB pixel grid.
pub type Frame = RgbImage;

/// Builds a frame of the given dimensions where every pixel equals
/// `color`. Deterministic, no side effects. Dimensions are validated at
/// session startup, before any stage runs.
pub fn solid(height: u32, width: u32, color: Color) -> Frame {
    RgbImage::from_pixel(width, height, Rgb::from(color))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pixel_equals_the_requested_color() {
        let color = Color::new(12, 200, 96);
        let frame = solid(24, 33, color);
        assert_eq!(frame.dimensions(), (33, 24));
        assert!(frame.pixels().all(|pixel| Color::from(*pixel) == color));
    }

    #[test]
    fn single_pixel_frame() {
        let frame = solid(1, 1, Color::new(255, 0, 0));
        assert_eq!(Color::from(*frame.get_pixel(0, 0)), Color::new(255, 0, 0));
    }
}

// THEORY:
// The `palette` module owns everything the pipeline knows about color.
// `Color` is a "dumb" 24-bit RGB container whose methods are pure
// arithmetic over the packed representation. `name_of` is an exact-match
// lookup against the sixteen CSS basic colors; a color outside the table
// is an `UnknownColor` error, never a nearest-neighbor guess, so a label
// on screen is always literally true. `ColorPicker` draws uniformly from
// a palette injected at construction rather than read from a global,
// with the RNG part of its state so tests can seed it and replay an
// exact color sequence through the whole pipeline.

use crate::error::StreamError;
use image::Rgb;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fmt;

/// The sixteen CSS basic colors, keyed by packed 24-bit RGB.
/// `name_of` remaps the raw `magenta`/`cyan` entries on the way out.
const CSS_BASIC_NAMES: [(u32, &str); 16] = [
    (0x000000, "black"),
    (0xC0C0C0, "silver"),
    (0x808080, "gray"),
    (0xFFFFFF, "white"),
    (0x800000, "maroon"),
    (0xFF0000, "red"),
    (0x800080, "purple"),
    (0xFF00FF, "magenta"),
    (0x008000, "green"),
    (0x00FF00, "lime"),
    (0x808000, "olive"),
    (0xFFFF00, "yellow"),
    (0x000080, "navy"),
    (0x0000FF, "blue"),
    (0x008080, "teal"),
    (0x00FFFF, "cyan"),
];

/// Hex of yellow, white, black, lime, red, aqua, fuchsia and blue.
const DEFAULT_PALETTE_HEX: [&str; 8] = [
    "#FFFF00", "#FFFFFF", "#000000", "#00FF00", "#FF0000", "#00FFFF", "#FF00FF", "#0000FF",
];

/// A "dumb" data container for one 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Packs the three channels into the low 24 bits, `0xRRGGBB`.
    pub fn packed(self) -> u32 {
        (u32::from(self.red) << 16) | (u32::from(self.green) << 8) | u32::from(self.blue)
    }

    /// Unpacks the low 24 bits of `value`; anything above bit 23 is ignored.
    pub fn from_packed(value: u32) -> Self {
        Self {
            red: ((value >> 16) & 0xFF) as u8,
            green: ((value >> 8) & 0xFF) as u8,
            blue: (value & 0xFF) as u8,
        }
    }

    /// The bitwise complement over the packed 24-bit value. Involutive:
    /// complementing twice returns the original color.
    pub fn complement(self) -> Self {
        Self::from_packed(0xFFFFFF ^ self.packed())
    }

    /// Parses a `#RRGGBB` triplet (leading `#` optional).
    pub fn from_hex(hex: &str) -> Result<Self, StreamError> {
        let malformed = || StreamError::InvalidInput(format!("malformed hex color {hex:?}"));
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            return Err(malformed());
        }
        let packed = u32::from_str_radix(digits, 16).map_err(|_| malformed())?;
        Ok(Self::from_packed(packed))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl From<Rgb<u8>> for Color {
    fn from(pixel: Rgb<u8>) -> Self {
        Self::new(pixel[0], pixel[1], pixel[2])
    }
}

impl From<Color> for Rgb<u8> {
    fn from(color: Color) -> Self {
        Rgb([color.red, color.green, color.blue])
    }
}

/// Maps a color to its name via exact match on the packed value.
/// `magenta` and `cyan` are reported as `fuchsia` and `aqua`.
pub fn name_of(color: Color) -> Result<&'static str, StreamError> {
    let packed = color.packed();
    let raw = CSS_BASIC_NAMES
        .iter()
        .find(|(value, _)| *value == packed)
        .map(|(_, name)| *name)
        .ok_or(StreamError::UnknownColor(color))?;
    Ok(match raw {
        "magenta" => "fuchsia",
        "cyan" => "aqua",
        other => other,
    })
}

/// The stock eight-color palette the binary runs with.
pub fn default_palette() -> Vec<Color> {
    DEFAULT_PALETTE_HEX
        .iter()
        .map(|hex| Color::from_hex(hex).expect("default palette literals are valid"))
        .collect()
}

/// Draws colors uniformly at random from an injected palette.
pub struct ColorPicker {
    palette: Vec<Color>,
    rng: StdRng,
}

impl ColorPicker {
    /// An entropy-seeded picker. Fails fast on an empty palette.
    pub fn new(palette: Vec<Color>) -> Result<Self, StreamError> {
        Self::build(palette, StdRng::from_entropy())
    }

    /// A deterministic picker; the same seed replays the same sequence.
    pub fn with_seed(palette: Vec<Color>, seed: u64) -> Result<Self, StreamError> {
        Self::build(palette, StdRng::seed_from_u64(seed))
    }

    fn build(palette: Vec<Color>, rng: StdRng) -> Result<Self, StreamError> {
        if palette.is_empty() {
            return Err(StreamError::EmptyPalette);
        }
        Ok(Self { palette, rng })
    }

    pub fn pick(&mut self) -> Color {
        *self
            .palette
            .choose(&mut self.rng)
            .expect("palette verified non-empty at construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_is_involutive() {
        for color in default_palette() {
            assert_eq!(color.complement().complement(), color);
        }
        let odd = Color::new(17, 200, 3);
        assert_eq!(odd.complement().complement(), odd);
    }

    #[test]
    fn complement_of_black_is_white() {
        let black = Color::new(0, 0, 0);
        assert_eq!(black.complement(), Color::new(255, 255, 255));
    }

    #[test]
    fn names_match_the_css_table() {
        assert_eq!(name_of(Color::new(255, 0, 0)).unwrap(), "red");
        assert_eq!(name_of(Color::new(0, 0, 0)).unwrap(), "black");
        assert_eq!(name_of(Color::new(0, 255, 0)).unwrap(), "lime");
    }

    #[test]
    fn magenta_and_cyan_are_remapped() {
        assert_eq!(name_of(Color::new(255, 0, 255)).unwrap(), "fuchsia");
        assert_eq!(name_of(Color::new(0, 255, 255)).unwrap(), "aqua");
    }

    #[test]
    fn off_table_colors_are_rejected() {
        let err = name_of(Color::new(1, 2, 3)).unwrap_err();
        assert!(matches!(err, StreamError::UnknownColor(_)));
    }

    #[test]
    fn hex_round_trip() {
        let color = Color::from_hex("#FFFF00").unwrap();
        assert_eq!(color, Color::new(255, 255, 0));
        assert_eq!(color.to_string(), "#FFFF00");
        assert!(Color::from_hex("not-a-color").is_err());
    }

    #[test]
    fn empty_palette_fails_fast() {
        assert!(matches!(
            ColorPicker::new(Vec::new()),
            Err(StreamError::EmptyPalette)
        ));
    }

    #[test]
    fn picker_only_draws_from_its_palette() {
        let palette = default_palette();
        let mut picker = ColorPicker::with_seed(palette.clone(), 7).unwrap();
        for _ in 0..64 {
            assert!(palette.contains(&picker.pick()));
        }
    }

    #[test]
    fn seeded_pickers_replay_the_same_sequence() {
        let mut a = ColorPicker::with_seed(default_palette(), 42).unwrap();
        let mut b = ColorPicker::with_seed(default_palette(), 42).unwrap();
        let left: Vec<Color> = (0..32).map(|_| a.pick()).collect();
        let right: Vec<Color> = (0..32).map(|_| b.pick()).collect();
        assert_eq!(left, right);
    }
}

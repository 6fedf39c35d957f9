//! Colour inputs accepted by the LED operations.

use smart_leds::RGB8;

/// A colour as supplied by the caller.
///
/// LED setters take `impl Into<Color>`, so a packed `0xRRGGBB` integer, an
/// `(r, g, b)` tuple, a `[u8; 3]` array, an [`RGB8`] or a byte slice can be
/// passed directly. Packed values above `0xFFFFFF` and slices whose length
/// is not 3 are rejected by [`Color::to_rgb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color<'a> {
    /// Big-endian packed value, `0xRRGGBB`.
    Packed(u32),
    Rgb(RGB8),
    Bytes(&'a [u8]),
}

impl Color<'_> {
    /// Interpret the colour as an RGB triple.
    pub fn to_rgb(self) -> Option<RGB8> {
        match self {
            Color::Packed(value) if value <= 0x00FF_FFFF => {
                let [_, r, g, b] = value.to_be_bytes();
                Some(RGB8::new(r, g, b))
            }
            Color::Packed(_) => None,
            Color::Rgb(rgb) => Some(rgb),
            Color::Bytes(&[r, g, b]) => Some(RGB8::new(r, g, b)),
            Color::Bytes(_) => None,
        }
    }
}

impl From<u32> for Color<'_> {
    fn from(value: u32) -> Self {
        Color::Packed(value)
    }
}

impl From<RGB8> for Color<'_> {
    fn from(value: RGB8) -> Self {
        Color::Rgb(value)
    }
}

impl From<(u8, u8, u8)> for Color<'_> {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::Rgb(RGB8::new(r, g, b))
    }
}

impl From<[u8; 3]> for Color<'_> {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color::Rgb(RGB8::new(r, g, b))
    }
}

impl<'a> From<&'a [u8]> for Color<'a> {
    fn from(value: &'a [u8]) -> Self {
        Color::Bytes(value)
    }
}

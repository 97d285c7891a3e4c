//! Hex color values for matrix cells
//!
//! Supported input formats:
//! - `#RGB` - each digit is doubled (e.g., `#F00` -> red)
//! - `#RGBA` - each digit is doubled, explicit alpha
//! - `#RRGGBB` - alpha defaults to 255 (opaque)
//! - `#RRGGBBAA` - explicit alpha channel
//!
//! Colors are always written back as lowercase `#rrggbb`, with an alpha
//! suffix only when the color is not fully opaque.

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Input string doesn't start with '#'
    #[error("color must start with '#'")]
    MissingHash,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// A single cell color.
///
/// Serializes as a hex string so matrices stay readable in the exchange
/// format and in the persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub Rgba<u8>);

impl Color {
    pub const BLACK: Color = Color(Rgba([0, 0, 0, 255]));

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Rgba([r, g, b, 255]))
    }

    pub fn rgba(self) -> Rgba<u8> {
        self.0
    }

    /// Lowercase hex form, `#rrggbb` or `#rrggbbaa` when translucent.
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.0 .0;
        if a == 255 {
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_color(s).map(Color)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Parse a hex color string into an RGBA color.
///
/// # Examples
///
/// ```
/// use pixeldrop::color::parse_hex_color;
///
/// assert_eq!(parse_hex_color("#F00").unwrap(), image::Rgba([255, 0, 0, 255]));
/// assert_eq!(parse_hex_color("#3b82f6").unwrap(), image::Rgba([59, 130, 246, 255]));
/// ```
///
/// # Errors
///
/// Returns `ColorError` if the input is empty, lacks the leading `#`, has
/// the wrong number of digits, or contains a non-hex character.
pub fn parse_hex_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    if s.is_empty() {
        return Err(ColorError::Empty);
    }
    let hex = s.strip_prefix('#').ok_or(ColorError::MissingHash)?;

    if let Some(c) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(c));
    }

    // All characters are ASCII hex digits from here on, so byte slicing is safe.
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|d| d * 17);
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);

    let rgba = match hex.len() {
        3 => [digit(0), digit(1), digit(2), Ok(255)],
        4 => [digit(0), digit(1), digit(2), digit(3)],
        6 => [pair(0), pair(2), pair(4), Ok(255)],
        8 => [pair(0), pair(2), pair(4), pair(6)],
        len => return Err(ColorError::InvalidLength(len)),
    };

    let mut out = [0u8; 4];
    for (slot, channel) in out.iter_mut().zip(rgba) {
        *slot = channel.map_err(|_| ColorError::InvalidHex('?'))?;
    }
    Ok(Rgba(out))
}

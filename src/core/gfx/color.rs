//=========================================================================
// Color
//=========================================================================
//
// RGBA color value with HTML-style parsing and formatting.
//
// Accepted inputs:
//   "red", "Navy"         one of the 16 HTML color names
//   "#f80", "f80c"        3/4 hex digits, each digit duplicated
//   "#ff8800", "ff8800cc" 6/8 hex digits
//   0xff8800              integer, alpha is opaque
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::str::FromStr;

//=== Internal Dependencies ===============================================

use crate::error::{Result, SgeError};

//=== Named Colors ========================================================

const NAMED_COLORS: [(&str, u32); 16] = [
    ("white", 0xffffff),
    ("silver", 0xc0c0c0),
    ("gray", 0x808080),
    ("black", 0x000000),
    ("red", 0xff0000),
    ("maroon", 0x800000),
    ("yellow", 0xffff00),
    ("olive", 0x808000),
    ("lime", 0x00ff00),
    ("green", 0x008000),
    ("aqua", 0x00ffff),
    ("teal", 0x008080),
    ("blue", 0x0000ff),
    ("navy", 0x000080),
    ("fuchsia", 0xff00ff),
    ("purple", 0x800080),
];

//=== Color ===============================================================

/// An RGBA color. `alpha == 0` is fully transparent, `255` fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const LIME: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Creates an opaque color.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue, alpha: 255 }
    }

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self { red, green, blue, alpha }
    }

    /// Creates an opaque color from `0xRRGGBB`. Bits above 24 are ignored.
    pub const fn from_int(value: u32) -> Self {
        Self::rgb(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        )
    }

    /// Parses a color name or HTML hex string.
    ///
    /// # Examples
    ///
    /// ```
    /// use sge::core::gfx::Color;
    ///
    /// assert_eq!(Color::parse("Navy").unwrap(), Color::rgb(0, 0, 128));
    /// assert_eq!(Color::parse("#F80").unwrap(), Color::rgb(255, 136, 0));
    /// assert!(Color::parse("#12345").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self> {
        let lower = value.trim().to_ascii_lowercase();
        if let Some(&(_, int)) = NAMED_COLORS.iter().find(|(name, _)| *name == lower) {
            return Ok(Self::from_int(int));
        }

        let digits = lower.strip_prefix('#').unwrap_or(&lower);
        let invalid = || SgeError::InvalidColor(value.to_string());

        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).map_err(|_| invalid());
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());

        match digits.len() {
            3 => Ok(Self::rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
            4 => Ok(Self::rgba(
                nibble(0)? * 17,
                nibble(1)? * 17,
                nibble(2)? * 17,
                nibble(3)? * 17,
            )),
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(invalid()),
        }
    }

    /// `#rrggbb` when opaque, `#rrggbbaa` otherwise.
    pub fn hex_string(&self) -> String {
        if self.alpha == 255 {
            format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                self.red, self.green, self.blue, self.alpha
            )
        }
    }

    /// `0xRRGGBB`, alpha excluded.
    pub fn to_int(&self) -> u32 {
        (self.red as u32) << 16 | (self.green as u32) << 8 | self.blue as u32
    }

    /// Lowercase HTML name, if this is an opaque named color.
    pub fn name(&self) -> Option<&'static str> {
        if self.alpha != 255 {
            return None;
        }
        let int = self.to_int();
        NAMED_COLORS
            .iter()
            .find(|(_, value)| *value == int)
            .map(|(name, _)| *name)
    }

    /// Returns the same color with a different alpha.
    pub fn with_alpha(self, alpha: u8) -> Self {
        Self { alpha, ..self }
    }
}

//--- Trait Implementations -----------------------------------------------

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Color {
    type Err = SgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self::from_int(value)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::rgb(r, g, b)
    }
}

impl From<(u8, u8, u8, u8)> for Color {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        Self::rgba(r, g, b, a)
    }
}

impl From<Color> for [u8; 4] {
    fn from(c: Color) -> Self {
        [c.red, c.green, c.blue, c.alpha]
    }
}

/// Prints the color name when there is one, the hex string otherwise.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => f.write_str(&self.hex_string()),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(Color::parse("WHITE").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("fuchsia").unwrap(), Color::rgb(255, 0, 255));
    }

    #[test]
    fn parses_all_hex_lengths() {
        assert_eq!(Color::parse("#abc").unwrap(), Color::rgb(0xaa, 0xbb, 0xcc));
        assert_eq!(Color::parse("abcd").unwrap(), Color::rgba(0xaa, 0xbb, 0xcc, 0xdd));
        assert_eq!(Color::parse("#102030").unwrap(), Color::rgb(0x10, 0x20, 0x30));
        assert_eq!(
            Color::parse("#10203040").unwrap(),
            Color::rgba(0x10, 0x20, 0x30, 0x40)
        );
    }

    #[test]
    fn rejects_bad_strings() {
        for bad in ["", "#", "#12", "#12345", "#gggggg", "chartreuse", "#+12"] {
            assert!(
                matches!(Color::parse(bad), Err(SgeError::InvalidColor(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn integer_round_trip_drops_alpha() {
        let c = Color::from(0x12ab34);
        assert_eq!(c, Color::rgb(0x12, 0xab, 0x34));
        assert_eq!(c.with_alpha(3).to_int(), 0x12ab34);
    }

    #[test]
    fn hex_string_includes_alpha_only_when_translucent() {
        assert_eq!(Color::rgb(1, 2, 3).hex_string(), "#010203");
        assert_eq!(Color::rgba(1, 2, 3, 4).hex_string(), "#01020304");
    }

    #[test]
    fn display_prefers_names() {
        assert_eq!(Color::rgb(0, 128, 128).to_string(), "teal");
        assert_eq!(Color::rgb(0, 128, 129).to_string(), "#008081");
        assert_eq!(Color::rgb(0, 128, 128).with_alpha(10).to_string(), "#0080800a");
    }
}

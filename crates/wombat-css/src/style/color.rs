//! CSS color values.
//!
//! [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)

use serde::Serialize;

use wombat_common::warning::warn_once;

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

/// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
///
/// The sixteen basic keywords plus the handful used by the default stylesheet
/// and the browser chrome.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("silver", [192, 192, 192]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("white", [255, 255, 255]),
    ("maroon", [128, 0, 0]),
    ("red", [255, 0, 0]),
    ("purple", [128, 0, 128]),
    ("fuchsia", [255, 0, 255]),
    ("magenta", [255, 0, 255]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("olive", [128, 128, 0]),
    ("yellow", [255, 255, 0]),
    ("navy", [0, 0, 128]),
    ("blue", [0, 0, 255]),
    ("teal", [0, 128, 128]),
    ("aqua", [0, 255, 255]),
    ("cyan", [0, 255, 255]),
    ("orange", [255, 165, 0]),
    ("lightblue", [173, 216, 230]),
    ("lightgray", [211, 211, 211]),
    ("lightgrey", [211, 211, 211]),
    ("darkgray", [169, 169, 169]),
    ("darkgrey", [169, 169, 169]),
];

impl Color {
    /// Black (#000000)
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White (#ffffff)
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Fully transparent.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// An opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    ///
    /// Accepts `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa`.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        let short = |i: usize| channel(&digits[i..=i].repeat(2));
        match digits.len() {
            3 => Some(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Some(Self {
                r: short(0)?,
                g: short(1)?,
                b: short(2)?,
                a: short(3)?,
            }),
            6 => Some(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            8 => Some(Self {
                r: channel(&digits[0..2])?,
                g: channel(&digits[2..4])?,
                b: channel(&digits[4..6])?,
                a: channel(&digits[6..8])?,
            }),
            _ => None,
        }
    }

    /// Look up a color keyword, case-insensitively.
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name == "transparent" {
            return Some(Self::TRANSPARENT);
        }
        NAMED_COLORS
            .iter()
            .find(|(keyword, _)| *keyword == name)
            .map(|&(_, [r, g, b])| Self::rgb(r, g, b))
    }

    /// Parse a keyword or hex color.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value.starts_with('#') {
            Self::from_hex(value)
        } else {
            Self::from_named(value)
        }
    }

    /// Parse `value`, warning once and falling back to `fallback` when it is
    /// not a color this engine understands.
    #[must_use]
    pub fn parse_or(value: &str, fallback: Self) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            warn_once("CSS", &format!("unsupported color '{value}'"));
            fallback
        })
    }

    /// Whether the color is fully transparent.
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(Color::parse("#f00"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("#00ff7f"), Some(Color::rgb(0, 255, 127)));
        assert_eq!(Color::parse("#0000ff80").map(|c| c.a), Some(0x80));
        assert_eq!(Color::parse("#12"), None);
        assert_eq!(Color::parse("#zzz"), None);
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(Color::parse("Blue"), Some(Color::rgb(0, 0, 255)));
        assert_eq!(Color::parse("lightblue"), Some(Color::rgb(173, 216, 230)));
        assert!(Color::parse("transparent").is_some_and(|c| c.is_transparent()));
        assert_eq!(Color::parse("notacolor"), None);
    }
}

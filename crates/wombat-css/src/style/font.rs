//! Font descriptors.
//!
//! [CSS Fonts Module Level 4](https://www.w3.org/TR/css-fonts-4/)

use serde::Serialize;
use strum_macros::{Display, EnumString};

use super::length::DEFAULT_FONT_SIZE_PX;

/// [§ 3.2 'font-weight'](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// "normal" (400)
    #[default]
    Normal,
    /// "bold" (700)
    Bold,
}

/// [§ 3.3 'font-style'](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
///
/// `normal` maps to the upright `roman` face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright glyphs.
    #[default]
    #[strum(to_string = "roman", serialize = "normal")]
    Roman,
    /// Slanted glyphs.
    #[strum(to_string = "italic", serialize = "oblique")]
    Italic,
}

/// A concrete font: pixel size plus face selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Font {
    /// Size in CSS pixels.
    pub size: f32,
    /// Weight.
    pub weight: FontWeight,
    /// Style.
    pub style: FontStyle,
}

impl Font {
    /// Create a font descriptor.
    #[must_use]
    pub const fn new(size: f32, weight: FontWeight, style: FontStyle) -> Self {
        Self {
            size,
            weight,
            style,
        }
    }

    /// Key for metric caches: size rounded to whole pixels plus the face.
    #[must_use]
    pub fn cache_key(&self) -> (u32, FontWeight, FontStyle) {
        (self.size.round().max(1.0) as u32, self.weight, self.style)
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_SIZE_PX, FontWeight::Normal, FontStyle::Roman)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_style_keywords() {
        assert_eq!("normal".parse::<FontStyle>(), Ok(FontStyle::Roman));
        assert_eq!("italic".parse::<FontStyle>(), Ok(FontStyle::Italic));
        assert_eq!("BOLD".parse::<FontWeight>(), Ok(FontWeight::Bold));
        assert_eq!(
            "900".parse::<FontWeight>(),
            Err(strum::ParseError::VariantNotFound)
        );
        assert_eq!(FontStyle::Roman.to_string(), "roman");
    }
}

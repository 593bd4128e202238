//! CSS length values.
//!
//! [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
//!
//! Only pixels and, for `font-size`, percentages are understood.

/// User agent default font size.
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// Largest font size text is laid out and drawn with. Larger values are
/// clamped to it.
pub const MAX_FONT_SIZE_PX: f32 = 512.0;

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LengthValue {
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    /// "1px = 1/96th of 1in"
    Px(f32),
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    Percent(f32),
}

impl LengthValue {
    /// Parse `12px` or `90%`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if let Some(number) = value.strip_suffix("px") {
            return number.parse().ok().map(Self::Px);
        }
        if let Some(number) = value.strip_suffix('%') {
            return number.parse().ok().map(Self::Percent);
        }
        None
    }

    /// Resolve against `reference` (used for percentages).
    #[must_use]
    pub fn to_px(self, reference: f32) -> f32 {
        match self {
            Self::Px(px) => px,
            Self::Percent(percent) => reference * percent / 100.0,
        }
    }
}

/// Parse a value that must be an absolute pixel length.
#[must_use]
pub fn parse_px(value: &str) -> Option<f32> {
    match LengthValue::parse(value)? {
        LengthValue::Px(px) => Some(px),
        LengthValue::Percent(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lengths() {
        assert_eq!(LengthValue::parse("12px"), Some(LengthValue::Px(12.0)));
        assert_eq!(LengthValue::parse("90%"), Some(LengthValue::Percent(90.0)));
        assert_eq!(LengthValue::parse("1.5em"), None);
        assert_eq!(parse_px("4px"), Some(4.0));
        assert_eq!(parse_px("50%"), None);
    }

    #[test]
    fn test_percent_resolves_against_reference() {
        let size = LengthValue::Percent(150.0).to_px(16.0);
        assert!((size - 24.0).abs() < f32::EPSILON);
    }
}

//! Font measurement.
//!
//! Layout only needs widths and vertical metrics, never glyph outlines, so it
//! talks to fonts through [`FontMetrics`]. The browser crate supplies a real
//! implementation backed by system fonts; [`ApproximateFontMetrics`] gives
//! deterministic numbers for tests and headless runs.

use crate::style::{Font, FontWeight};

/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// "CSS assumes that every font has font metrics that specify a
/// characteristic height above the baseline and a depth below it."
pub trait FontMetrics {
    /// Advance width of `text` in `font`.
    fn text_width(&self, text: &str, font: &Font) -> f32;

    /// Height above the baseline.
    fn ascent(&self, font: &Font) -> f32;

    /// Depth below the baseline, as a positive number.
    fn descent(&self, font: &Font) -> f32;

    /// Standard distance between consecutive baselines.
    fn line_height(&self, font: &Font) -> f32 {
        self.ascent(font) + self.descent(font)
    }
}

/// Fixed-ratio metrics: every character is `0.6em` wide (`0.66em` in bold),
/// ascent is `0.8em` and descent `0.2em`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateFontMetrics;

impl FontMetrics for ApproximateFontMetrics {
    fn text_width(&self, text: &str, font: &Font) -> f32 {
        const CHAR_WIDTH_RATIO: f32 = 0.6;
        const BOLD_WIDTH_RATIO: f32 = 0.66;
        let ratio = match font.weight {
            FontWeight::Normal => CHAR_WIDTH_RATIO,
            FontWeight::Bold => BOLD_WIDTH_RATIO,
        };
        text.chars().count() as f32 * font.size * ratio
    }

    fn ascent(&self, font: &Font) -> f32 {
        font.size * 0.8
    }

    fn descent(&self, font: &Font) -> f32 {
        font.size * 0.2
    }
}

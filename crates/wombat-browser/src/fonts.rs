//! System fonts and the metrics layout measures with.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."
//!
//! Faces are loaded from the file system once per process. Vertical metrics
//! are cached per (size, weight, style) and never evicted.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

use fontdue::FontSettings;
use wombat_common::warning::warn_once;
use wombat_css::{ApproximateFontMetrics, Font, FontMetrics, FontStyle, FontWeight};

/// Common system font paths to search for a default (regular) font.
const FONT_SEARCH_PATHS: &[&str] = &[
    // macOS
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/SFNS.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    // Windows
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// System font paths for bold variants.
const FONT_BOLD_SEARCH_PATHS: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// System font paths for italic variants.
const FONT_ITALIC_SEARCH_PATHS: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial Italic.ttf",
    "/Library/Fonts/Arial Italic.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Italic.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansOblique.ttf",
    "C:\\Windows\\Fonts\\ariali.ttf",
];

/// System font paths for bold-italic variants.
const FONT_BOLD_ITALIC_SEARCH_PATHS: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial Bold Italic.ttf",
    "/Library/Fonts/Arial Bold Italic.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-BoldOblique.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-BoldOblique.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-BoldItalic.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBoldOblique.ttf",
    "C:\\Windows\\Fonts\\arialbi.ttf",
];

static SYSTEM_FONTS: OnceLock<FontSet> = OnceLock::new();

/// Ascent and descent of one font at one size.
#[derive(Debug, Clone, Copy)]
struct VerticalMetrics {
    ascent: f32,
    descent: f32,
}

static VERTICAL_METRICS: OnceLock<Mutex<HashMap<(u32, FontWeight, FontStyle), VerticalMetrics>>> =
    OnceLock::new();

/// The four faces text is drawn with. Any of them may be missing.
pub struct FontSet {
    regular: Option<fontdue::Font>,
    bold: Option<fontdue::Font>,
    italic: Option<fontdue::Font>,
    bold_italic: Option<fontdue::Font>,
}

impl FontSet {
    /// The process-wide set, loaded on first use.
    #[must_use]
    pub fn system() -> &'static Self {
        SYSTEM_FONTS.get_or_init(|| {
            let fonts = Self {
                regular: load_font_from_paths(FONT_SEARCH_PATHS),
                bold: load_font_from_paths(FONT_BOLD_SEARCH_PATHS),
                italic: load_font_from_paths(FONT_ITALIC_SEARCH_PATHS),
                bold_italic: load_font_from_paths(FONT_BOLD_ITALIC_SEARCH_PATHS),
            };
            if fonts.regular.is_none() {
                warn_once("Fonts", "no system font found; text will not be drawn");
            }
            fonts
        })
    }

    /// Best available face for a weight and style, falling back through
    /// partial matches to the regular face.
    #[must_use]
    pub fn select(&self, weight: FontWeight, style: FontStyle) -> Option<&fontdue::Font> {
        let regular = self.regular.as_ref();
        match (weight, style) {
            (FontWeight::Bold, FontStyle::Italic) => self
                .bold_italic
                .as_ref()
                .or(self.bold.as_ref())
                .or(regular),
            (FontWeight::Bold, FontStyle::Roman) => self.bold.as_ref().or(regular),
            (FontWeight::Normal, FontStyle::Italic) => self.italic.as_ref().or(regular),
            (FontWeight::Normal, FontStyle::Roman) => regular,
        }
    }
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("regular", &self.regular.is_some())
            .field("bold", &self.bold.is_some())
            .field("italic", &self.italic.is_some())
            .field("bold_italic", &self.bold_italic.is_some())
            .finish()
    }
}

fn load_font_from_paths(paths: &[&str]) -> Option<fontdue::Font> {
    paths.iter().find_map(|path| {
        let data = std::fs::read(path).ok()?;
        fontdue::Font::from_bytes(data, FontSettings::default()).ok()
    })
}

/// Font metrics backed by fontdue's per-glyph metrics.
///
/// Widths are the sum of per-character advance widths, matching the cursor
/// advancement of the raster surface. When no system font is available the
/// numbers come from [`ApproximateFontMetrics`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FontdueFontMetrics;

impl FontdueFontMetrics {
    fn vertical(font: &Font) -> VerticalMetrics {
        let cache = VERTICAL_METRICS.get_or_init(|| Mutex::new(HashMap::new()));
        let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
        *cache.entry(font.cache_key()).or_insert_with(|| {
            FontSet::system()
                .select(font.weight, font.style)
                .and_then(|face| face.horizontal_line_metrics(font.size))
                .map_or_else(
                    || VerticalMetrics {
                        ascent: ApproximateFontMetrics.ascent(font),
                        descent: ApproximateFontMetrics.descent(font),
                    },
                    |line| VerticalMetrics {
                        ascent: line.ascent,
                        descent: -line.descent,
                    },
                )
        })
    }
}

impl FontMetrics for FontdueFontMetrics {
    fn text_width(&self, text: &str, font: &Font) -> f32 {
        let Some(face) = FontSet::system().select(font.weight, font.style) else {
            return ApproximateFontMetrics.text_width(text, font);
        };
        text.chars()
            .filter(|ch| !ch.is_control())
            .map(|ch| face.metrics(ch, font.size).advance_width)
            .sum()
    }

    fn ascent(&self, font: &Font) -> f32 {
        Self::vertical(font).ascent
    }

    fn descent(&self, font: &Font) -> f32 {
        Self::vertical(font).descent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_are_positive() {
        let font = Font::default();
        let metrics = FontdueFontMetrics;
        assert!(metrics.ascent(&font) > 0.0);
        assert!(metrics.descent(&font) >= 0.0);
        assert!(metrics.text_width("hello", &font) > 0.0);
    }

    #[test]
    fn test_width_grows_with_text() {
        let font = Font::default();
        let metrics = FontdueFontMetrics;
        assert!(metrics.text_width("hello world", &font) > metrics.text_width("hello", &font));
        assert!(metrics.text_width("", &font).abs() < f32::EPSILON);
    }

    #[test]
    fn test_cached_metrics_are_stable() {
        let font = Font::new(20.0, FontWeight::Bold, FontStyle::Italic);
        let metrics = FontdueFontMetrics;
        let first = metrics.ascent(&font);
        assert!((metrics.ascent(&font) - first).abs() < f32::EPSILON);
    }
}

//! Browser window tunables.

use wombat_css::LayoutConfig;

/// Window and page geometry.
///
/// The defaults reproduce the classic 800×600 window with a 13px horizontal
/// and 18px vertical page margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrowserConfig {
    /// Window width in pixels.
    pub width: f32,
    /// Window height in pixels, chrome included.
    pub height: f32,
    /// Horizontal page margin (HSTEP).
    pub hstep: f32,
    /// Vertical page margin (VSTEP).
    pub vstep: f32,
    /// Distance moved by one scroll event.
    pub scroll_step: f32,
    /// Width of `<input>` and `<button>` boxes.
    pub input_width: f32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            hstep: 13.0,
            vstep: 18.0,
            scroll_step: 100.0,
            input_width: 200.0,
        }
    }
}

impl BrowserConfig {
    /// The subset of the configuration layout needs.
    #[must_use]
    pub const fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            width: self.width,
            hstep: self.hstep,
            vstep: self.vstep,
            input_width: self.input_width,
        }
    }
}

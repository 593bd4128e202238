//! Browser chrome: the back button and address bar above the page.
//!
//! The chrome paints with the same display commands as page content, into
//! its own surface at the top of the window.

use wombat_css::{Color, DisplayCommand, DisplayList, Font, FontMetrics, FontStyle, FontWeight, Rect};

/// Space around and inside chrome widgets.
const PADDING: f32 = 5.0;

/// Font size of chrome text.
const CHROME_FONT_SIZE: f32 = 20.0;

/// Result of a click inside the chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeAction {
    /// The back button was pressed.
    Back,
    /// The address bar took focus.
    FocusAddress,
    /// The click hit no widget.
    None,
}

/// Geometry and editing state of the chrome.
#[derive(Debug, Clone)]
pub struct Chrome {
    width: f32,
    font: Font,
    font_height: f32,
    back_rect: Rect,
    address_rect: Rect,
    bottom: f32,
    focused: bool,
    address_bar: String,
}

impl Chrome {
    /// Lay out the chrome for a window `width` pixels wide.
    #[must_use]
    pub fn new(width: f32, metrics: &dyn FontMetrics) -> Self {
        let font = Font::new(CHROME_FONT_SIZE, FontWeight::Normal, FontStyle::Roman);
        let font_height = metrics.line_height(&font);
        let back_width = metrics.text_width("<", &font) + 2.0 * PADDING;
        let back_rect = Rect::new(PADDING, PADDING, back_width, font_height);
        let address_x = back_rect.right() + PADDING;
        let address_rect = Rect::new(
            address_x,
            PADDING,
            (width - address_x - PADDING).max(0.0),
            font_height,
        );
        Self {
            width,
            font,
            font_height,
            back_rect,
            address_rect,
            bottom: font_height + 2.0 * PADDING,
            focused: false,
            address_bar: String::new(),
        }
    }

    /// Height of the chrome band; page content starts below it.
    #[must_use]
    pub const fn bottom(&self) -> f32 {
        self.bottom
    }

    /// Whether the address bar has keyboard focus.
    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Text currently typed into the address bar.
    #[must_use]
    pub fn address_text(&self) -> &str {
        &self.address_bar
    }

    /// Handle a click at window coordinates.
    pub fn click(&mut self, x: f32, y: f32) -> ChromeAction {
        self.focused = false;
        if self.back_rect.contains(x, y) {
            ChromeAction::Back
        } else if self.address_rect.contains(x, y) {
            self.focused = true;
            self.address_bar.clear();
            ChromeAction::FocusAddress
        } else {
            ChromeAction::None
        }
    }

    /// Type a character into the address bar. Returns whether the chrome
    /// consumed it.
    pub fn keypress(&mut self, ch: char) -> bool {
        if self.focused {
            self.address_bar.push(ch);
        }
        self.focused
    }

    /// Delete the last character of the address bar.
    pub fn backspace(&mut self) -> bool {
        if self.focused {
            let _ = self.address_bar.pop();
        }
        self.focused
    }

    /// Submit the address bar: the typed text, if it had focus.
    pub fn enter(&mut self) -> Option<String> {
        if !self.focused {
            return None;
        }
        self.focused = false;
        Some(std::mem::take(&mut self.address_bar))
    }

    /// Drop keyboard focus.
    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Paint the chrome, showing `url` unless the address bar is being edited.
    #[must_use]
    pub fn paint(&self, url: &str, metrics: &dyn FontMetrics) -> DisplayList {
        let mut display_list = DisplayList::new();
        display_list.push(DisplayCommand::FillRect {
            rect: Rect::new(0.0, 0.0, self.width, self.bottom),
            color: Color::WHITE,
        });
        display_list.push(line(0.0, self.bottom - 1.0, self.width, self.bottom - 1.0));

        display_list.push(outline(self.back_rect));
        display_list.push(self.text(self.back_rect.x + PADDING, self.back_rect.y, "<"));

        display_list.push(outline(self.address_rect));
        let text_x = self.address_rect.x + PADDING;
        if self.focused {
            display_list.push(self.text(text_x, self.address_rect.y, &self.address_bar));
            let caret_x = text_x + metrics.text_width(&self.address_bar, &self.font);
            display_list.push(line(
                caret_x,
                self.address_rect.y,
                caret_x,
                self.address_rect.bottom(),
            ));
        } else {
            display_list.push(self.text(text_x, self.address_rect.y, url));
        }
        display_list
    }

    fn text(&self, x: f32, y: f32, text: &str) -> DisplayCommand {
        DisplayCommand::TextRun {
            x,
            y,
            height: self.font_height,
            text: text.to_string(),
            font: self.font,
            color: Color::BLACK,
        }
    }
}

const fn outline(rect: Rect) -> DisplayCommand {
    DisplayCommand::Outline {
        rect,
        color: Color::BLACK,
        thickness: 1.0,
    }
}

const fn line(x1: f32, y1: f32, x2: f32, y2: f32) -> DisplayCommand {
    DisplayCommand::Line {
        x1,
        y1,
        x2,
        y2,
        color: Color::BLACK,
        thickness: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use wombat_css::ApproximateFontMetrics;

    use super::*;

    fn chrome() -> Chrome {
        Chrome::new(800.0, &ApproximateFontMetrics)
    }

    #[test]
    fn test_bottom_is_font_height_plus_padding() {
        // 20px font: ascent 16 + descent 4.
        assert!((chrome().bottom() - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_click_back_button() {
        let mut chrome = chrome();
        assert_eq!(chrome.click(10.0, 10.0), ChromeAction::Back);
        assert!(!chrome.is_focused());
    }

    #[test]
    fn test_typing_into_address_bar() {
        let mut chrome = chrome();
        assert!(!chrome.keypress('x'));
        assert_eq!(chrome.click(400.0, 10.0), ChromeAction::FocusAddress);
        for ch in "http://b.test/".chars() {
            assert!(chrome.keypress(ch));
        }
        assert!(chrome.keypress('!'));
        assert!(chrome.backspace());
        assert_eq!(chrome.address_text(), "http://b.test/");
        assert_eq!(chrome.enter().as_deref(), Some("http://b.test/"));
        assert!(!chrome.is_focused());
        assert_eq!(chrome.enter(), None);
    }

    #[test]
    fn test_click_outside_widgets() {
        let mut chrome = chrome();
        let _ = chrome.click(400.0, 10.0);
        assert_eq!(chrome.click(400.0, 29.5), ChromeAction::None);
        assert!(!chrome.is_focused());
    }

    #[test]
    fn test_paint_shows_url_or_caret() {
        let mut chrome = chrome();
        let shows = |list: &DisplayList, wanted: &str| {
            list.commands().iter().any(|command| {
                matches!(command, DisplayCommand::TextRun { text, .. } if text == wanted)
            })
        };
        let idle = chrome.paint("http://a.test/", &ApproximateFontMetrics);
        assert!(shows(&idle, "http://a.test/"));

        let _ = chrome.click(400.0, 10.0);
        let _ = chrome.keypress('h');
        let editing = chrome.paint("http://a.test/", &ApproximateFontMetrics);
        assert!(shows(&editing, "h"));
        assert!(!shows(&editing, "http://a.test/"));
        let lines = editing
            .commands()
            .iter()
            .filter(|command| matches!(command, DisplayCommand::Line { .. }))
            .count();
        assert_eq!(lines, 2);
    }
}

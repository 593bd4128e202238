//! Display list: a flat sequence of drawing commands.
//!
//! [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)

use serde::Serialize;

use crate::layout::Rect;
use crate::style::{Color, Font};

/// A single drawing command, in page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum DisplayCommand {
    /// Fill a rectangle with a solid color.
    FillRect {
        /// Area to fill.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// [§ 5 'border-radius'](https://www.w3.org/TR/css-backgrounds-3/#border-radius)
    ///
    /// Fill a rectangle whose four corners are rounded by the same radius.
    RoundedRect {
        /// Area to fill.
        rect: Rect,
        /// Corner radius in pixels.
        radius: f32,
        /// Fill color.
        color: Color,
    },
    /// Stroke the edges of a rectangle, inside its bounds.
    Outline {
        /// Rectangle to outline.
        rect: Rect,
        /// Stroke color.
        color: Color,
        /// Stroke width in pixels.
        thickness: f32,
    },
    /// A straight line segment.
    Line {
        /// Start x.
        x1: f32,
        /// Start y.
        y1: f32,
        /// End x.
        x2: f32,
        /// End y.
        y2: f32,
        /// Stroke color.
        color: Color,
        /// Stroke width in pixels.
        thickness: f32,
    },
    /// A run of text whose top-left corner is at (`x`, `y`).
    TextRun {
        /// Left edge.
        x: f32,
        /// Top edge; the baseline sits one ascent below it.
        y: f32,
        /// Line height of the run, used for clipping.
        height: f32,
        /// The text.
        text: String,
        /// Font to draw with.
        font: Font,
        /// Text color.
        color: Color,
    },
}

impl DisplayCommand {
    /// Topmost y coordinate touched by the command.
    #[must_use]
    pub fn top(&self) -> f32 {
        match self {
            Self::FillRect { rect, .. }
            | Self::RoundedRect { rect, .. }
            | Self::Outline { rect, .. } => rect.y,
            Self::Line { y1, y2, .. } => y1.min(*y2),
            Self::TextRun { y, .. } => *y,
        }
    }

    /// Bottommost y coordinate touched by the command.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        match self {
            Self::FillRect { rect, .. }
            | Self::RoundedRect { rect, .. }
            | Self::Outline { rect, .. } => rect.bottom(),
            Self::Line { y1, y2, .. } => y1.max(*y2),
            Self::TextRun { y, height, .. } => y + height,
        }
    }

    /// Whether any part of the command falls inside the vertical band
    /// `[top, bottom]`.
    #[must_use]
    pub fn intersects_band(&self, top: f32, bottom: f32) -> bool {
        self.top() <= bottom && self.bottom() >= top
    }
}

/// Drawing commands in painting order, back to front.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DisplayList {
    commands: Vec<DisplayCommand>,
}

impl DisplayList {
    /// Create an empty display list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Append a command.
    pub fn push(&mut self, command: DisplayCommand) {
        self.commands.push(command);
    }

    /// The commands in painting order.
    #[must_use]
    pub fn commands(&self) -> &[DisplayCommand] {
        &self.commands
    }

    /// Number of commands.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the list has no commands.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Extend<DisplayCommand> for DisplayList {
    fn extend<I: IntoIterator<Item = DisplayCommand>>(&mut self, iter: I) {
        self.commands.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_intersection() {
        let fill = DisplayCommand::FillRect {
            rect: Rect::new(0.0, 100.0, 50.0, 20.0),
            color: Color::BLACK,
        };
        assert!(fill.intersects_band(110.0, 500.0));
        assert!(fill.intersects_band(0.0, 100.0));
        assert!(!fill.intersects_band(121.0, 500.0));
        assert!(!fill.intersects_band(0.0, 99.0));
    }

    #[test]
    fn test_line_extent_is_order_independent() {
        let line = DisplayCommand::Line {
            x1: 0.0,
            y1: 40.0,
            x2: 0.0,
            y2: 10.0,
            color: Color::BLACK,
            thickness: 1.0,
        };
        assert!((line.top() - 10.0).abs() < f32::EPSILON);
        assert!((line.bottom() - 40.0).abs() < f32::EPSILON);
    }
}

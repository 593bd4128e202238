//! Painter: generates a display list from a layout tree.
//!
//! [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
//!
//! The walk is a plain pre-order traversal: a box paints its own background
//! and content before any of its children, so later boxes draw on top.

use wombat_common::warning::warn_once;
use wombat_dom::{DomTree, NodeId};

use super::{DisplayCommand, DisplayList};
use crate::layout::{FontMetrics, LayoutKind, LayoutNode, LayoutTree, Rect};
use crate::style::{self, Color};

/// Width of input borders and the text caret.
const STROKE: f32 = 1.0;

/// Painter that reads styles from the DOM the layout tree was built from.
pub struct Painter<'a> {
    dom: &'a DomTree,
    metrics: &'a dyn FontMetrics,
}

impl<'a> Painter<'a> {
    /// Create a painter. `metrics` places the caret after an input's text.
    #[must_use]
    pub fn new(dom: &'a DomTree, metrics: &'a dyn FontMetrics) -> Self {
        Self { dom, metrics }
    }

    /// Paint a laid-out tree.
    #[must_use]
    pub fn paint(&self, layout: &LayoutTree) -> DisplayList {
        let mut display_list = DisplayList::new();
        for id in layout.preorder() {
            let Some(layout_node) = layout.get(id) else {
                continue;
            };
            match &layout_node.kind {
                LayoutKind::Block => self.paint_background(layout_node, &mut display_list),
                LayoutKind::Text { word } => {
                    self.paint_text(layout_node, word, &mut display_list);
                }
                LayoutKind::Input => self.paint_input(layout_node, &mut display_list),
                LayoutKind::Document | LayoutKind::Line => {}
            }
        }
        display_list
    }

    /// [§ 3.10 'background-color'](https://www.w3.org/TR/css-backgrounds-3/#background-color)
    ///
    /// Nothing is painted for `transparent`, the initial value.
    fn paint_background(&self, layout_node: &LayoutNode, display_list: &mut DisplayList) {
        let node = layout_node.node;
        let Some(color) = style::background_color(self.dom, node) else {
            return;
        };
        let rect = layout_node.rect();
        let radius = style::border_radius(self.dom, node);
        if radius > 0.0 {
            display_list.push(DisplayCommand::RoundedRect {
                rect,
                radius,
                color,
            });
        } else {
            display_list.push(DisplayCommand::FillRect { rect, color });
        }
    }

    fn paint_text(&self, layout_node: &LayoutNode, word: &str, display_list: &mut DisplayList) {
        display_list.push(DisplayCommand::TextRun {
            x: layout_node.x,
            y: layout_node.y,
            height: layout_node.height,
            text: word.to_string(),
            font: layout_node.font.unwrap_or_default(),
            color: style::text_color(self.dom, layout_node.node),
        });
    }

    fn paint_input(&self, layout_node: &LayoutNode, display_list: &mut DisplayList) {
        let node = layout_node.node;
        let rect = layout_node.rect();
        let font = layout_node.font.unwrap_or_default();

        self.paint_background(layout_node, display_list);
        display_list.push(DisplayCommand::Outline {
            rect,
            color: Color::BLACK,
            thickness: STROKE,
        });

        let text = self.input_text(node);
        if !text.is_empty() {
            display_list.push(DisplayCommand::TextRun {
                x: rect.x,
                y: rect.y,
                height: rect.height,
                text: text.clone(),
                font,
                color: style::text_color(self.dom, node),
            });
        }

        if self.dom.is_focused(node) && self.dom.is_element(node, "input") {
            let cx = rect.x + self.metrics.text_width(&text, &font);
            display_list.push(caret(cx, &rect));
        }
    }

    /// The text an input or button shows: an input's `value`, or a button's
    /// single text child.
    fn input_text(&self, node: NodeId) -> String {
        if self.dom.is_element(node, "input") {
            return self.dom.attribute(node, "value").unwrap_or_default().to_string();
        }
        let children = self.dom.children(node);
        if children.is_empty() {
            return String::new();
        }
        let only_text = match children {
            [only] => self.dom.as_text(*only),
            _ => None,
        };
        only_text.map_or_else(
            || {
                warn_once("Paint", "ignoring HTML contents inside button");
                String::new()
            },
            str::to_string,
        )
    }
}

fn caret(x: f32, rect: &Rect) -> DisplayCommand {
    DisplayCommand::Line {
        x1: x,
        y1: rect.y,
        x2: x,
        y2: rect.bottom(),
        color: Color::BLACK,
        thickness: STROKE,
    }
}

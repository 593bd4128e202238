//! The two-pass layout algorithm.
//!
//! [CSS 2.1 § 10 Visual formatting model details](https://www.w3.org/TR/CSS2/visudet.html)
//!
//! Every box is laid out in the same order:
//!
//! 1. Top-down: take `x`, `y` and `width` from the parent (and `y` from the
//!    previous sibling's bottom edge when there is one).
//! 2. Build the child boxes: one block per DOM child in block mode, or lines
//!    of words and inputs in inline mode.
//! 3. Lay out every child.
//! 4. Bottom-up: compute `height` from the finished children.
//!
//! A box's height is never read before all of its children are done.

use wombat_dom::{DomTree, NodeId};

use super::{BLOCK_ELEMENTS, FontMetrics, LayoutConfig, LayoutId, LayoutKind, LayoutTree};
use crate::style::{Font, resolve_font};

/// Line boxes are this much taller than the tallest glyph extents on them.
const LINE_SPACING: f32 = 1.25;

/// How a block arranges its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayoutMode {
    /// One child block per DOM child, stacked vertically.
    Block,
    /// Words and inputs flowed into lines.
    Inline,
}

struct LayoutEngine<'a> {
    dom: &'a DomTree,
    metrics: &'a dyn FontMetrics,
    config: LayoutConfig,
    tree: LayoutTree,
}

/// Build and lay out the layout tree for a styled DOM.
#[must_use]
pub fn layout(dom: &DomTree, metrics: &dyn FontMetrics, config: &LayoutConfig) -> LayoutTree {
    let mut engine = LayoutEngine {
        dom,
        metrics,
        config: *config,
        tree: LayoutTree::new(),
    };
    engine.layout_document();
    engine.tree
}

impl LayoutEngine<'_> {
    fn layout_document(&mut self) {
        let root = self.dom.root();
        let document = self.tree.alloc(LayoutKind::Document, root, None, None);
        {
            let doc = &mut self.tree[document];
            doc.width = self.config.width - 2.0 * self.config.hstep;
            doc.x = self.config.hstep;
            doc.y = self.config.vstep;
        }
        let child = self.tree.alloc(LayoutKind::Block, root, Some(document), None);
        self.layout_block(child);
        self.tree[document].height = self.tree[child].height + 2.0 * self.config.vstep;
    }

    /// Inline if the node is text, or if it has children and none of them is
    /// a block-level element. Childless elements are blocks.
    fn layout_mode(&self, node: NodeId) -> LayoutMode {
        if self.dom.as_text(node).is_some() {
            return LayoutMode::Inline;
        }
        let children = self.dom.children(node);
        if children.is_empty() {
            return LayoutMode::Block;
        }
        let has_block_child = children.iter().any(|&child| {
            self.dom
                .tag_name(child)
                .is_some_and(|tag| BLOCK_ELEMENTS.contains(&tag))
        });
        if has_block_child {
            LayoutMode::Block
        } else {
            LayoutMode::Inline
        }
    }

    /// Position `id` below its previous sibling, or at its parent's top.
    fn stack(&mut self, id: LayoutId) {
        let (parent, previous) = (self.tree[id].parent, self.tree[id].previous);
        let (x, top, width) = parent.map_or((0.0, 0.0, 0.0), |p| {
            let p = &self.tree[p];
            (p.x, p.y, p.width)
        });
        let y = previous.map_or(top, |prev| self.tree[prev].y + self.tree[prev].height);
        let node = &mut self.tree[id];
        node.x = x;
        node.y = y;
        node.width = width;
    }

    fn layout_block(&mut self, id: LayoutId) {
        self.stack(id);

        let dom = self.dom;
        let node = self.tree[id].node;
        match self.layout_mode(node) {
            LayoutMode::Block => {
                let mut previous = None;
                for &child in dom.children(node) {
                    previous = Some(self.tree.alloc(LayoutKind::Block, child, Some(id), previous));
                }
            }
            LayoutMode::Inline => {
                let mut cursor_x = 0.0;
                let _ = self.new_line(id, &mut cursor_x);
                self.recurse(id, node, &mut cursor_x);
            }
        }

        for child in self.tree.children(id).to_vec() {
            match self.tree[child].kind {
                LayoutKind::Block => self.layout_block(child),
                LayoutKind::Line => self.layout_line(child),
                _ => {}
            }
        }

        self.tree[id].height = self
            .tree
            .children(id)
            .iter()
            .map(|&child| self.tree[child].height)
            .sum();
    }

    /// Walk the DOM below an inline-mode block, emitting words and inputs.
    fn recurse(&mut self, block: LayoutId, node: NodeId, cursor_x: &mut f32) {
        let dom = self.dom;
        if let Some(text) = dom.as_text(node) {
            for word in text.split_whitespace() {
                let font = resolve_font(dom, node);
                let width = self.metrics.text_width(word, &font);
                let kind = LayoutKind::Text {
                    word: word.to_string(),
                };
                self.place(block, kind, node, font, width, cursor_x);
            }
            return;
        }
        match dom.tag_name(node) {
            Some("br") => {
                let _ = self.new_line(block, cursor_x);
            }
            Some("input" | "button") => {
                let font = resolve_font(dom, node);
                let width = self.config.input_width;
                self.place(block, LayoutKind::Input, node, font, width, cursor_x);
            }
            _ => {
                for &child in dom.children(node) {
                    self.recurse(block, child, cursor_x);
                }
            }
        }
    }

    fn new_line(&mut self, block: LayoutId, cursor_x: &mut f32) -> LayoutId {
        *cursor_x = 0.0;
        let last = self.tree.children(block).last().copied();
        let node = self.tree[block].node;
        self.tree.alloc(LayoutKind::Line, node, Some(block), last)
    }

    /// Append an atomic inline box of the given width to the current line,
    /// starting a new line first if it would overflow.
    ///
    /// A box wider than the block on an empty line stays on that line; words
    /// are never split.
    fn place(
        &mut self,
        block: LayoutId,
        kind: LayoutKind,
        node: NodeId,
        font: Font,
        width: f32,
        cursor_x: &mut f32,
    ) {
        let current = self.tree.children(block).last().copied();
        let mut line = match current {
            Some(line) => line,
            None => self.new_line(block, cursor_x),
        };
        let overflows = *cursor_x + width > self.tree[block].width;
        if overflows && !self.tree.children(line).is_empty() {
            line = self.new_line(block, cursor_x);
        }
        let previous = self.tree.children(line).last().copied();
        let leaf = self.tree.alloc(kind, node, Some(line), previous);
        self.tree[leaf].font = Some(font);
        *cursor_x += width + self.metrics.text_width(" ", &font);
    }

    fn layout_line(&mut self, id: LayoutId) {
        self.stack(id);

        let children = self.tree.children(id).to_vec();
        for &child in &children {
            self.layout_leaf(child);
        }
        if children.is_empty() {
            self.tree[id].height = 0.0;
            return;
        }

        let font_of = |tree: &LayoutTree, child: LayoutId| tree[child].font.unwrap_or_default();
        let max_ascent = children
            .iter()
            .map(|&child| self.metrics.ascent(&font_of(&self.tree, child)))
            .fold(0.0, f32::max);
        let max_descent = children
            .iter()
            .map(|&child| self.metrics.descent(&font_of(&self.tree, child)))
            .fold(0.0, f32::max);

        let baseline = self.tree[id].y + LINE_SPACING * max_ascent;
        for &child in &children {
            let ascent = self.metrics.ascent(&font_of(&self.tree, child));
            self.tree[child].y = baseline - ascent;
        }
        self.tree[id].height = LINE_SPACING * (max_ascent + max_descent);
    }

    /// Width, `x` and height of a word or input. Its `y` is set by the line
    /// once every sibling's font is known.
    fn layout_leaf(&mut self, id: LayoutId) {
        let font = self.tree[id].font.unwrap_or_default();
        let width = match &self.tree[id].kind {
            LayoutKind::Text { word } => self.metrics.text_width(word, &font),
            LayoutKind::Input => self.config.input_width,
            _ => 0.0,
        };
        let x = match self.tree[id].previous {
            Some(prev) => {
                let prev = &self.tree[prev];
                let space = self.metrics.text_width(" ", &prev.font.unwrap_or_default());
                prev.x + space + prev.width
            }
            None => self.tree[id].parent.map_or(0.0, |line| self.tree[line].x),
        };
        let height = self.metrics.line_height(&font);

        let leaf = &mut self.tree[id];
        leaf.width = width;
        leaf.x = x;
        leaf.height = height;
    }
}

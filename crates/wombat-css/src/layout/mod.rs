//! Layout tree and geometry.
//!
//! [CSS 2.1 § 9 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html)
//!
//! The layout tree runs parallel to the DOM. It is rebuilt from scratch on
//! every render and stored in an arena like the DOM itself, so the parent and
//! previous-sibling links are plain [`LayoutId`] indices.
//!
//! ```text
//! Document
//! └── Block (html)
//!     ├── Block (head)
//!     └── Block (body)
//!         └── Block (p)           inline mode
//!             ├── Line
//!             │   ├── Text "Hello"
//!             │   └── Input
//!             └── Line
//!                 └── Text "world"
//! ```
//!
//! See [`engine`] for the two-pass algorithm that fills in the geometry.

/// The layout algorithm.
pub mod engine;
/// Font measurement.
pub mod metrics;

pub use engine::layout;
pub use metrics::{ApproximateFontMetrics, FontMetrics};

use std::ops::{Index, IndexMut};

use serde::Serialize;
use strum_macros::Display;

use wombat_dom::NodeId;

use crate::style::Font;

/// [§ 9.2.1 Block-level elements](https://www.w3.org/TR/CSS2/visuren.html#block-boxes)
///
/// Elements whose presence among a node's children switches that node into
/// block layout mode.
pub const BLOCK_ELEMENTS: &[&str] = &[
    "html",
    "body",
    "article",
    "section",
    "nav",
    "aside",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hgroup",
    "header",
    "footer",
    "address",
    "p",
    "hr",
    "pre",
    "blockquote",
    "ol",
    "ul",
    "menu",
    "li",
    "dl",
    "dt",
    "dd",
    "figure",
    "figcaption",
    "main",
    "div",
    "table",
    "form",
    "fieldset",
    "legend",
    "details",
    "summary",
];

/// Viewport and box constants used by layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Viewport width in pixels.
    pub width: f32,
    /// Horizontal page margin.
    pub hstep: f32,
    /// Vertical page margin.
    pub vstep: f32,
    /// Width of `<input>` and `<button>` boxes.
    pub input_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            hstep: 13.0,
            vstep: 18.0,
            input_width: 200.0,
        }
    }
}

/// Index of a node in a [`LayoutTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LayoutId(pub usize);

/// The closed set of layout node kinds.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayoutKind {
    /// The root, holding a single page-level block.
    Document,
    /// A block box stacking vertically inside its parent.
    Block,
    /// One line of an inline formatting context.
    Line,
    /// A single word.
    Text {
        /// The word, without surrounding whitespace.
        word: String,
    },
    /// An atomic `<input>` or `<button>` box.
    Input,
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Half-open containment: left and top edges are inside, right and
    /// bottom edges are not.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.x <= x && x < self.right() && self.y <= y && y < self.bottom()
    }
}

/// A node of the layout tree.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutNode {
    /// Which kind of box this is.
    #[serde(flatten)]
    pub kind: LayoutKind,
    /// The DOM node this box was generated for. Lines point at their block's node.
    #[serde(skip)]
    pub node: NodeId,
    /// Owning box, `None` for the document.
    pub parent: Option<LayoutId>,
    /// Previous sibling, used for stacking.
    pub previous: Option<LayoutId>,
    /// Child boxes in order.
    pub children: Vec<LayoutId>,
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height, only valid once all children have been laid out.
    pub height: f32,
    /// Font of a text or input box.
    pub font: Option<Font>,
}

impl LayoutNode {
    /// Bounds of the box.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Arena holding a layout tree. The first node is the document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayoutTree {
    nodes: Vec<LayoutNode>,
}

impl LayoutTree {
    /// Create an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// The document box.
    #[must_use]
    pub const fn root(&self) -> LayoutId {
        LayoutId(0)
    }

    /// Number of boxes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no box has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a box by id.
    #[must_use]
    pub fn get(&self, id: LayoutId) -> Option<&LayoutNode> {
        self.nodes.get(id.0)
    }

    /// Get a box mutably by id.
    pub fn get_mut(&mut self, id: LayoutId) -> Option<&mut LayoutNode> {
        self.nodes.get_mut(id.0)
    }

    /// Child boxes of `id`.
    #[must_use]
    pub fn children(&self, id: LayoutId) -> &[LayoutId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Allocate a box and append it to `parent`'s children.
    pub fn alloc(
        &mut self,
        kind: LayoutKind,
        node: NodeId,
        parent: Option<LayoutId>,
        previous: Option<LayoutId>,
    ) -> LayoutId {
        let id = LayoutId(self.nodes.len());
        self.nodes.push(LayoutNode {
            kind,
            node,
            parent,
            previous,
            children: Vec::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            font: None,
        });
        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children.push(id);
        }
        id
    }

    /// All boxes in pre-order, document first.
    #[must_use]
    pub fn preorder(&self) -> Vec<LayoutId> {
        let mut out = Vec::new();
        if self.is_empty() {
            return out;
        }
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Height of the whole document, margins included.
    #[must_use]
    pub fn document_height(&self) -> f32 {
        self.get(self.root()).map_or(0.0, |doc| doc.height)
    }

    /// The DOM node of the innermost box containing the point, in page
    /// coordinates. The last box in pre-order wins.
    #[must_use]
    pub fn hit_test(&self, x: f32, y: f32) -> Option<NodeId> {
        self.preorder()
            .into_iter()
            .rev()
            .filter_map(|id| self.get(id))
            .find(|node| node.rect().contains(x, y))
            .map(|node| node.node)
    }
}

impl Index<LayoutId> for LayoutTree {
    type Output = LayoutNode;

    fn index(&self, id: LayoutId) -> &LayoutNode {
        &self.nodes[id.0]
    }
}

impl IndexMut<LayoutId> for LayoutTree {
    fn index_mut(&mut self, id: LayoutId) -> &mut LayoutNode {
        &mut self.nodes[id.0]
    }
}

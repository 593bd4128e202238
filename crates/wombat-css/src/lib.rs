//! CSS parsing, selector matching, cascade, layout and paint for the Wombat engine.
//!
//! # Scope
//!
//! - **CSS Parser**: a recursive-descent parser for rule blocks and inline
//!   `style` attributes, recovering from malformed input by skipping ahead.
//! - **Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/)):
//!   type selectors and the descendant combinator, with a tag-count priority.
//! - **Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/)):
//!   priority-ordered rule application followed by the inline style. No
//!   inheritance.
//! - **Layout** ([CSS 2.1 § 9](https://www.w3.org/TR/CSS2/visuren.html)):
//!   document, block, line, text and input boxes with word-level line breaking.
//! - **Paint** ([CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html)):
//!   a flat display list of rectangles, outlines, lines and text runs.
//!
//! # Not Implemented
//!
//! - Class, ID, attribute and pseudo selectors
//! - Margins, padding and borders
//! - Property inheritance in the cascade (text properties are looked up on
//!   ancestors at layout and paint time instead)

/// Style resolution per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod cascade;
/// Box tree and geometry per [CSS 2.1 § 9](https://www.w3.org/TR/CSS2/visuren.html).
pub mod layout;
/// Display list and painting per [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html).
pub mod paint;
/// Stylesheet and inline-style parser.
pub mod parser;
/// Selector matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// Typed style values and text-style lookup.
pub mod style;
/// Default stylesheet per [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html).
pub mod ua_stylesheet;

pub use cascade::{cascade_priority, compute_style, resolve, serialize_style, sort_rules};
pub use layout::{
    ApproximateFontMetrics, FontMetrics, LayoutConfig, LayoutId, LayoutKind, LayoutNode,
    LayoutTree, Rect, layout,
};
pub use paint::{DisplayCommand, DisplayList, Painter};
pub use parser::{
    CSSParser, CssParseError, Declaration, Rule, parse_declarations, parse_selector,
    parse_stylesheet,
};
pub use selector::Selector;
pub use style::{Color, Font, FontStyle, FontWeight, MAX_FONT_SIZE_PX};
pub use ua_stylesheet::{DEFAULT_STYLESHEET, default_stylesheet};

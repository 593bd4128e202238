//! Paint
//!
//! [CSS 2.1 Appendix E - Elaborate description of Stacking Contexts](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! Painting flattens a laid-out tree into a [`DisplayList`]. Nothing here
//! touches pixels; the browser crate's raster surface executes the commands.
//!
//! ```text
//! Style → Layout → Paint → Raster → Composite
//!                    ↓
//!              DisplayList
//! ```

mod display_list;
mod painter;

pub use display_list::{DisplayCommand, DisplayList};
pub use painter::Painter;

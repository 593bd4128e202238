//! Style values and text-style lookup.
//!
//! The cascade stores raw strings. Layout and paint turn them into typed
//! values here. Text properties (`font-size`, `font-weight`, `font-style`,
//! `color`) are looked up on the node first and then on its ancestors, since a
//! text node's own computed style is normally empty.

/// Color values.
pub mod color;
/// Font descriptors.
pub mod font;
/// Length values.
pub mod length;

pub use color::Color;
pub use font::{Font, FontStyle, FontWeight};
pub use length::{DEFAULT_FONT_SIZE_PX, LengthValue, MAX_FONT_SIZE_PX, parse_px};

use std::iter;

use wombat_common::warning::warn_once;
use wombat_dom::{DomTree, NodeId};

/// Find `property` on `id` or its nearest ancestor that sets it.
///
/// Returns the node that carries the value along with the value.
#[must_use]
pub fn lookup<'a>(tree: &'a DomTree, id: NodeId, property: &str) -> Option<(NodeId, &'a str)> {
    iter::once(id).chain(tree.ancestors(id)).find_map(|candidate| {
        tree.style(candidate)
            .and_then(|style| style.get(property))
            .map(|value| (candidate, value.as_str()))
    })
}

/// Font size in pixels for `id`, within `0..=MAX_FONT_SIZE_PX`.
///
/// Percentages resolve against the size of the parent of the node that
/// carries them. Unknown, negative and non-finite values are reported and
/// ignored.
#[must_use]
pub fn font_size(tree: &DomTree, id: NodeId) -> f32 {
    let Some((owner, value)) = lookup(tree, id, "font-size") else {
        return DEFAULT_FONT_SIZE_PX;
    };
    let parent_size = || tree.parent(owner).map_or(DEFAULT_FONT_SIZE_PX, |p| font_size(tree, p));
    let size = match LengthValue::parse(value) {
        Some(length @ LengthValue::Px(_)) => length.to_px(0.0),
        Some(length @ LengthValue::Percent(_)) => length.to_px(parent_size()),
        None => f32::NAN,
    };
    if !size.is_finite() || size < 0.0 {
        warn_once("CSS", &format!("unsupported font-size '{value}'"));
        return parent_size();
    }
    size.min(MAX_FONT_SIZE_PX)
}

/// Font weight for `id`. Numeric weights of 600 and above are bold.
#[must_use]
pub fn font_weight(tree: &DomTree, id: NodeId) -> FontWeight {
    let Some((_, value)) = lookup(tree, id, "font-weight") else {
        return FontWeight::Normal;
    };
    value.parse().unwrap_or_else(|_| match value.parse::<u16>() {
        Ok(weight) if weight >= 600 => FontWeight::Bold,
        Ok(_) => FontWeight::Normal,
        Err(_) => {
            warn_once("CSS", &format!("unsupported font-weight '{value}'"));
            FontWeight::Normal
        }
    })
}

/// Font style for `id`; `normal` is roman.
#[must_use]
pub fn font_style(tree: &DomTree, id: NodeId) -> FontStyle {
    lookup(tree, id, "font-style")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or_default()
}

/// The font used to draw text owned by `id`.
#[must_use]
pub fn resolve_font(tree: &DomTree, id: NodeId) -> Font {
    Font::new(
        font_size(tree, id),
        font_weight(tree, id),
        font_style(tree, id),
    )
}

/// The text color for `id`, black by default.
#[must_use]
pub fn text_color(tree: &DomTree, id: NodeId) -> Color {
    lookup(tree, id, "color").map_or(Color::BLACK, |(_, value)| {
        Color::parse_or(value, Color::BLACK)
    })
}

/// The node's own `background-color`, if it paints one.
///
/// Backgrounds are not looked up on ancestors.
#[must_use]
pub fn background_color(tree: &DomTree, id: NodeId) -> Option<Color> {
    let value = tree.style(id)?.get("background-color")?;
    if value == "transparent" {
        return None;
    }
    Some(Color::parse_or(value, Color::TRANSPARENT)).filter(|color| !color.is_transparent())
}

/// The node's own `border-radius` in pixels, zero when absent.
#[must_use]
pub fn border_radius(tree: &DomTree, id: NodeId) -> f32 {
    tree.style(id)
        .and_then(|style| style.get("border-radius"))
        .and_then(|value| parse_px(value))
        .unwrap_or(0.0)
}

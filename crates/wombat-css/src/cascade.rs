//! Style resolution.
//!
//! [CSS Cascading Level 4 § 6](https://www.w3.org/TR/css-cascade-4/#cascading)
//!
//! Every node starts from an empty map. Matching rules are applied in
//! ascending priority, each declaration overwriting any earlier value for the
//! same property, and the element's inline `style` attribute is applied last.
//! Nothing is inherited: a child never copies its parent's values.

use wombat_dom::{DomTree, NodeId, StyleMap};

use crate::parser::{Declaration, Rule, parse_declarations};

/// Sort key for the cascade: the selector's specificity.
#[must_use]
pub fn cascade_priority(rule: &Rule) -> u32 {
    rule.priority()
}

/// Stable-sort `rules` by ascending priority.
///
/// Rules of equal priority keep their relative order, so a later sheet (or a
/// later rule in the same sheet) wins ties.
pub fn sort_rules(rules: &mut [Rule]) {
    rules.sort_by_key(cascade_priority);
}

/// Compute the style of a single node against priority-sorted `rules`.
#[must_use]
pub fn compute_style(tree: &DomTree, id: NodeId, rules: &[Rule]) -> StyleMap {
    let mut style = StyleMap::new();
    for rule in rules.iter().filter(|rule| rule.selector.matches(tree, id)) {
        apply(&mut style, &rule.declarations);
    }
    if let Some(inline) = tree.attribute(id, "style") {
        apply(&mut style, &parse_declarations(inline));
    }
    style
}

/// Assign a computed style to every node reachable from the root.
///
/// `rules` must already be in cascade order (see [`sort_rules`]).
pub fn resolve(tree: &mut DomTree, rules: &[Rule]) {
    for id in tree.iter_all() {
        let style = compute_style(tree, id, rules);
        tree.set_style(id, style);
    }
}

fn apply(style: &mut StyleMap, declarations: &[Declaration]) {
    for declaration in declarations {
        let _ = style.insert(declaration.property.clone(), declaration.value.clone());
    }
}

/// Serialize a style map as an inline declaration block.
///
/// Properties are emitted in sorted order so the output is deterministic.
/// Feeding the result back through the `style` attribute reproduces `style`.
#[must_use]
pub fn serialize_style(style: &StyleMap) -> String {
    let mut pairs: Vec<(&String, &String)> = style.iter().collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(property, value)| format!("{property}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

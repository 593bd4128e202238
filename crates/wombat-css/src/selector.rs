//! Selector matching.
//!
//! Two selector kinds exist: a bare tag name, and a descendant combinator
//! joining two selectors. Specificity counts tag names.

use std::fmt;

use wombat_dom::{DomTree, NodeId};

/// A parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    ///
    /// Matches elements with exactly this (lowercase) tag name.
    Tag(String),
    /// [§ 15.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    ///
    /// Matches nodes matched by `descendant` that have a strict ancestor
    /// matched by `ancestor`.
    Descendant {
        /// Must match some strict ancestor.
        ancestor: Box<Selector>,
        /// Must match the node itself.
        descendant: Box<Selector>,
    },
}

impl Selector {
    /// Specificity: 1 per tag name in the chain.
    #[must_use]
    pub fn priority(&self) -> u32 {
        match self {
            Self::Tag(_) => 1,
            Self::Descendant {
                ancestor,
                descendant,
            } => ancestor.priority() + descendant.priority(),
        }
    }

    /// Whether the selector matches node `id` of `tree`.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        match self {
            Self::Tag(tag) => tree.tag_name(id) == Some(tag.as_str()),
            Self::Descendant {
                ancestor,
                descendant,
            } => {
                descendant.matches(tree, id)
                    && tree
                        .ancestors(id)
                        .any(|candidate| ancestor.matches(tree, candidate))
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => f.write_str(tag),
            Self::Descendant {
                ancestor,
                descendant,
            } => write!(f, "{ancestor} {descendant}"),
        }
    }
}

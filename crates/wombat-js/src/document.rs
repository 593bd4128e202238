//! The document state shared between the tab and its script context.

use std::cell::RefCell;
use std::rc::Rc;

use wombat_common::{ContentSecurityPolicy, Url};
use wombat_dom::DomTree;

/// Everything scripts may observe or change about the loaded document.
#[derive(Debug)]
pub struct DocumentState {
    /// The DOM.
    pub tree: DomTree,
    /// URL the document was loaded from; relative XHR URLs resolve against it.
    pub url: Url,
    /// Policy parsed from the document's response headers.
    pub csp: ContentSecurityPolicy,
    /// Set when a script mutated the tree; the owner re-renders and clears it.
    pub needs_render: bool,
}

impl DocumentState {
    /// A freshly loaded document.
    #[must_use]
    pub const fn new(tree: DomTree, url: Url, csp: ContentSecurityPolicy) -> Self {
        Self {
            tree,
            url,
            csp,
            needs_render: false,
        }
    }

    /// Wrap the state for sharing with a [`JsContext`](crate::JsContext).
    #[must_use]
    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }
}

/// Main-thread shared handle to a [`DocumentState`].
pub type SharedDocument = Rc<RefCell<DocumentState>>;

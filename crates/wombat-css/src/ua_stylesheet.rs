//! Default stylesheet.
//!
//! [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! "User agents are expected to have a default style sheet that presents elements
//! of HTML documents in ways consistent with general user expectations."
//!
//! These rules come first in every document's rule list, so at equal
//! specificity any author rule overrides them. The parser has no comment
//! syntax, so the sheet carries none.

use std::sync::OnceLock;

use crate::parser::{Rule, parse_stylesheet};

/// Source text of the default stylesheet.
pub const DEFAULT_STYLESHEET: &str = r"
pre { background-color: gray; }
a { color: blue; }
i { font-style: italic; }
em { font-style: italic; }
b { font-weight: bold; }
strong { font-weight: bold; }
small { font-size: 90%; }
big { font-size: 110%; }
h1 { font-size: 200%; font-weight: bold; }
h2 { font-size: 150%; font-weight: bold; }
h3 { font-size: 117%; font-weight: bold; }
input {
    font-size: 16px; font-weight: normal; font-style: normal;
    background-color: lightblue;
}
button {
    font-size: 16px; font-weight: normal; font-style: normal;
    background-color: orange;
}
";

/// The parsed default stylesheet, parsed once and cached.
#[must_use]
pub fn default_stylesheet() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| parse_stylesheet(DEFAULT_STYLESHEET))
}

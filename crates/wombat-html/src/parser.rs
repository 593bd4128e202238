//! Tree builder with implicit-tag recovery.
//!
//! The builder keeps a stack of open elements. Before every tag or text token
//! it runs the implicit-tag rules, which synthesize `<html>`, `<head>`,
//! `<body>` and `</head>` until the incoming token has a sensible place to go.
//! There are no insertion modes beyond that and no auto-closing of block
//! elements: `<p>a<p>b` nests the second paragraph inside the first.
//!
//! After the last token the root is given an empty `<head>` or `<body>` if
//! either is missing.
//!
//! The builder never fails. Stray closing tags pop whatever is open, surplus
//! closing tags are dropped, and anything left open at end of input is closed
//! innermost first.

use std::fmt::Write as _;

use wombat_dom::{AttributesMap, DomTree, NodeId, NodeType};

use crate::tokenizer::{HTMLTokenizer, Token};

/// Void elements: inserted as children of the current node but never pushed
/// onto the stack of open elements.
pub const SELF_CLOSING_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements that belong in `<head>`. Seeing one of these right after `<html>`
/// synthesizes `<head>` instead of `<body>`.
pub const HEAD_TAGS: &[&str] = &[
    "base", "basefont", "bgsound", "noscript", "link", "meta", "title", "style", "script",
];

/// Builds a [`DomTree`] from a token stream.
///
/// The first element allocated is always the root `<html>`, so the finished
/// tree is rooted at [`NodeId::ROOT`].
#[derive(Debug)]
pub struct HTMLParser {
    tokens: Vec<Token>,
    tree: DomTree,
    /// Stack of open elements, outermost first.
    unfinished: Vec<NodeId>,
}

impl HTMLParser {
    /// Create a new parser from a token stream.
    #[must_use]
    pub const fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            tree: DomTree::new(),
            unfinished: Vec::new(),
        }
    }

    /// Process every token and return the finished tree.
    #[must_use]
    pub fn run(mut self) -> DomTree {
        for token in std::mem::take(&mut self.tokens) {
            match token {
                Token::StartTag { name, attributes } => self.start_tag(&name, attributes),
                Token::EndTag { name } => self.end_tag(&name),
                Token::Text(text) => self.text(&text),
            }
        }
        self.finish()
    }

    fn start_tag(&mut self, name: &str, attributes: AttributesMap) {
        self.implicit_tags(Some(name));
        if SELF_CLOSING_TAGS.contains(&name) {
            let node = self.tree.alloc_element(name, attributes);
            if let Some(&parent) = self.unfinished.last() {
                self.tree.append_child(parent, node);
            }
        } else {
            self.open(name, attributes);
        }
    }

    fn end_tag(&mut self, name: &str) {
        self.implicit_tags(Some(format!("/{name}").as_str()));
        self.close();
    }

    /// Whitespace-only runs never become nodes.
    fn text(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.implicit_tags(None);
        let node = self.tree.alloc_text(text);
        if let Some(&parent) = self.unfinished.last() {
            self.tree.append_child(parent, node);
        }
    }

    /// Push a new element onto the stack of open elements.
    ///
    /// The element is attached to its parent when it is closed.
    fn open(&mut self, name: &str, attributes: AttributesMap) {
        let node = self.tree.alloc_element(name, attributes);
        self.unfinished.push(node);
    }

    /// Pop the current node and append it to the new current node.
    ///
    /// Ignored when only the root is open.
    fn close(&mut self) {
        if self.unfinished.len() <= 1 {
            return;
        }
        if let Some(node) = self.unfinished.pop()
            && let Some(&parent) = self.unfinished.last()
        {
            self.tree.append_child(parent, node);
        }
    }

    /// Synthesize missing structural tags before `incoming`.
    ///
    /// `incoming` is the tag about to be processed, with a leading `/` for
    /// closing tags, or `None` for text. The rules repeat until none fires.
    fn implicit_tags(&mut self, incoming: Option<&str>) {
        loop {
            let open: Vec<&str> = self
                .unfinished
                .iter()
                .filter_map(|&id| self.tree.tag_name(id))
                .collect();
            let is_head_tag = incoming.is_some_and(|tag| HEAD_TAGS.contains(&tag));

            if open.is_empty() && incoming != Some("html") {
                self.open("html", AttributesMap::new());
            } else if open == ["html"] && !matches!(incoming, Some("head" | "body" | "/html")) {
                if is_head_tag {
                    self.open("head", AttributesMap::new());
                } else {
                    self.open("body", AttributesMap::new());
                }
            } else if open == ["html", "head"] && incoming != Some("/head") && !is_head_tag {
                self.close();
            } else {
                break;
            }
        }
    }

    /// Close everything still open and return the tree.
    ///
    /// An input with no tokens at all still produces a bare `<html>` root.
    fn finish(mut self) -> DomTree {
        if self.unfinished.is_empty() {
            self.open("html", AttributesMap::new());
        }
        while self.unfinished.len() > 1 {
            self.close();
        }
        self.ensure_head_and_body();
        self.tree
    }

    /// Give the root a `<head>` (first) and a `<body>` (last) when the
    /// implicit-tag rules never had a reason to create them.
    fn ensure_head_and_body(&mut self) {
        let root = self.tree.root();
        let has_child = |tree: &DomTree, tag: &str| {
            tree.children(root)
                .iter()
                .any(|&child| tree.is_element(child, tag))
        };
        if !has_child(&self.tree, "head") {
            let head = self.tree.alloc_element("head", AttributesMap::new());
            self.tree.insert_child(root, 0, head);
        }
        if !has_child(&self.tree, "body") {
            let body = self.tree.alloc_element("body", AttributesMap::new());
            self.tree.append_child(root, body);
        }
    }
}

/// Parse a complete document.
#[must_use]
pub fn parse(html: &str) -> DomTree {
    let mut tokenizer = HTMLTokenizer::new(html.to_string());
    tokenizer.run();
    HTMLParser::new(tokenizer.into_tokens()).run()
}

/// Parse `html` as the contents of a `<body>`.
///
/// Returns the tree and the `<body>` element whose children are the parsed
/// fragment. Used for `innerHTML` assignment.
#[must_use]
pub fn parse_fragment(html: &str) -> (DomTree, NodeId) {
    let tree = parse(&format!("<html><body>{html}</body></html>"));
    let body = tree
        .children(tree.root())
        .iter()
        .copied()
        .find(|&child| tree.is_element(child, "body"))
        .unwrap_or_else(|| tree.root());
    (tree, body)
}

/// Render the subtree at `id` as an indented outline, one node per line.
#[must_use]
pub fn format_tree(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, 0, &mut out);
    out
}

fn write_node(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let prefix = "  ".repeat(indent);
    match &node.node_type {
        NodeType::Element(data) => {
            let mut attrs: Vec<String> = data
                .attrs
                .iter()
                .map(|(k, v)| {
                    if v.is_empty() {
                        k.clone()
                    } else {
                        format!("{k}=\"{v}\"")
                    }
                })
                .collect();
            attrs.sort();
            if attrs.is_empty() {
                let _ = writeln!(out, "{prefix}<{}>", data.tag_name);
            } else {
                let _ = writeln!(out, "{prefix}<{} {}>", data.tag_name, attrs.join(" "));
            }
        }
        NodeType::Text(text) => {
            let _ = writeln!(out, "{prefix}{text:?}");
        }
    }
    for &child in &node.children {
        write_node(tree, child, indent + 1, out);
    }
}

//! Tag-soup tokenizer.
//!
//! A character-at-a-time scan with two states, "in text" and "in tag". A `<`
//! flushes the pending text and enters the tag state; a `>` ends the tag and
//! turns its contents into a [`Token`]. Attribute values may be quoted to
//! contain whitespace, but there is no escaping, no comment
//! state and no raw-text state: `<` inside a `<script>` body starts a tag.

use wombat_dom::AttributesMap;

/// A token emitted by the tokenizer to the tree builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<name attr=value ...>`. Names are lowercased.
    StartTag {
        /// Lowercased tag name.
        name: String,
        /// Lowercased attribute names with quote-stripped values.
        attributes: AttributesMap,
    },
    /// `</name>`. The name is lowercased.
    EndTag {
        /// Lowercased tag name, without the leading `/`.
        name: String,
    },
    /// A run of text between tags, exactly as it appeared.
    Text(String),
}

/// Splits markup into start tags, end tags and text runs.
#[derive(Debug)]
pub struct HTMLTokenizer {
    input: String,
    tokens: Vec<Token>,
}

impl HTMLTokenizer {
    /// Create a tokenizer over `input`.
    #[must_use]
    pub const fn new(input: String) -> Self {
        Self {
            input,
            tokens: Vec::new(),
        }
    }

    /// Scan the whole input.
    ///
    /// Text left pending at end of input is flushed; an unterminated tag is
    /// discarded.
    pub fn run(&mut self) {
        let input = std::mem::take(&mut self.input);
        let mut buffer = String::new();
        let mut in_tag = false;
        for c in input.chars() {
            match c {
                '<' => {
                    in_tag = true;
                    if !buffer.is_empty() {
                        self.tokens.push(Token::Text(std::mem::take(&mut buffer)));
                    }
                }
                '>' => {
                    in_tag = false;
                    self.emit_tag(&std::mem::take(&mut buffer));
                }
                _ => buffer.push(c),
            }
        }
        if !in_tag && !buffer.is_empty() {
            self.tokens.push(Token::Text(buffer));
        }
    }

    /// Consume the tokenizer and return its tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Turn the contents between `<` and `>` into a token.
    ///
    /// Declarations and comments (`<!...>`) and empty tags produce nothing.
    fn emit_tag(&mut self, contents: &str) {
        let mut parts = split_tag_contents(contents).into_iter();
        let Some(first) = parts.next() else {
            return;
        };
        if first.starts_with('!') {
            return;
        }
        // `<br/>` and `<img src=x />` carry a trailing solidus we do not track.
        let name = first.trim_end_matches('/').to_lowercase();

        if let Some(name) = name.strip_prefix('/') {
            self.tokens.push(Token::EndTag {
                name: name.to_string(),
            });
            return;
        }

        let mut attributes = AttributesMap::new();
        for pair in parts.filter(|part| *part != "/") {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key, strip_quotes(value)),
                None => (pair, ""),
            };
            let _ = attributes.insert(key.to_lowercase(), value.to_string());
        }
        self.tokens.push(Token::StartTag { name, attributes });
    }
}

/// Split tag contents on whitespace, keeping quoted runs together so that
/// `style="color: red"` stays a single attribute.
fn split_tag_contents(contents: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = None;
    let mut quote = None;
    for (i, c) in contents.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => {
                quote = Some(c);
                let _ = start.get_or_insert(i);
            }
            (None, c) if c.is_whitespace() => {
                if let Some(from) = start.take() {
                    parts.push(&contents[from..i]);
                }
            }
            (None, _) => {
                let _ = start.get_or_insert(i);
            }
        }
    }
    if let Some(from) = start {
        parts.push(&contents[from..]);
    }
    parts
}

/// Remove one pair of surrounding quotes from an attribute value.
///
/// Values of two characters or fewer are left untouched, so `""` stays as the
/// literal two quote characters.
fn strip_quotes(value: &str) -> &str {
    let quoted = value.len() > 2 && (value.starts_with('"') || value.starts_with('\''));
    if !quoted {
        return value;
    }
    let mut chars = value.chars();
    let _ = chars.next();
    let _ = chars.next_back();
    chars.as_str()
}

//! Recursive-descent CSS parser.
//!
//! The grammar is deliberately tiny:
//!
//! ```text
//! stylesheet  := (selector '{' body '}')*
//! selector    := word (whitespace word)*
//! body        := (word ':' word ';')* (word ':' word)?
//! word        := [A-Za-z0-9#\-.%]+
//! ```
//!
//! Parsing never fails as a whole. A malformed declaration is skipped up to
//! the next `;` (or the closing `}`), and a malformed rule is skipped up to the
//! next `}`.

use std::mem;

use thiserror::Error;

use crate::selector::Selector;

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub property: String,
    /// The value exactly as written (a single word).
    pub value: String,
}

/// A selector with its declarations, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Which nodes the rule applies to.
    pub selector: Selector,
    /// Declarations in source order. Later duplicates win when applied.
    pub declarations: Vec<Declaration>,
}

impl Rule {
    /// Cascade priority of the rule, the specificity of its selector.
    #[must_use]
    pub fn priority(&self) -> u32 {
        self.selector.priority()
    }
}

/// Why the parser stopped at a given position.
///
/// Only [`parse_selector`] surfaces this; stylesheet and declaration parsing
/// recover from it internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CssParseError {
    /// No word characters at the position.
    #[error("expected a word at offset {0}")]
    ExpectedWord(usize),
    /// A specific punctuation character was required.
    #[error("expected '{expected}' at offset {offset}")]
    ExpectedLiteral {
        /// The character that was required.
        expected: char,
        /// Character offset in the input.
        offset: usize,
    },
    /// Input remained after a complete selector.
    #[error("unexpected '{found}' at offset {offset}")]
    Unexpected {
        /// The offending character.
        found: char,
        /// Character offset in the input.
        offset: usize,
    },
}

/// Cursor over CSS source text.
#[derive(Debug)]
pub struct CSSParser {
    chars: Vec<char>,
    i: usize,
}

impl CSSParser {
    /// Create a parser positioned at the start of `source`.
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            i: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.i).copied()
    }

    fn at_end(&self) -> bool {
        self.i >= self.chars.len()
    }

    fn whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.i += 1;
        }
    }

    fn word(&mut self) -> Result<String, CssParseError> {
        let start = self.i;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || "#-.%".contains(c))
        {
            self.i += 1;
        }
        if self.i == start {
            return Err(CssParseError::ExpectedWord(start));
        }
        Ok(self.chars[start..self.i].iter().collect())
    }

    fn literal(&mut self, expected: char) -> Result<(), CssParseError> {
        if self.peek() != Some(expected) {
            return Err(CssParseError::ExpectedLiteral {
                expected,
                offset: self.i,
            });
        }
        self.i += 1;
        Ok(())
    }

    fn pair(&mut self) -> Result<Declaration, CssParseError> {
        let property = self.word()?;
        self.whitespace();
        self.literal(':')?;
        self.whitespace();
        let value = self.word()?;
        Ok(Declaration {
            property: property.to_lowercase(),
            value,
        })
    }

    /// Advance to the first character in `stops` and return it, or `None` at
    /// end of input.
    fn ignore_until(&mut self, stops: &[char]) -> Option<char> {
        while let Some(c) = self.peek() {
            if stops.contains(&c) {
                return Some(c);
            }
            self.i += 1;
        }
        None
    }

    /// Parse declarations until end of input or an unconsumed `}`.
    ///
    /// A pair is kept as soon as it parses. Whatever follows it up to the
    /// next `;` is skipped if the `;` itself is missing.
    pub fn body(&mut self) -> Vec<Declaration> {
        let mut declarations = Vec::new();
        while !self.at_end() && self.peek() != Some('}') {
            let terminated = self.pair().and_then(|declaration| {
                declarations.push(declaration);
                self.whitespace();
                // The last declaration of a block may omit its semicolon.
                if !self.at_end() && self.peek() != Some('}') {
                    self.literal(';')?;
                }
                Ok(())
            });
            match terminated {
                Ok(()) => self.whitespace(),
                Err(_) => match self.ignore_until(&[';', '}']) {
                    Some(';') => {
                        self.i += 1;
                        self.whitespace();
                    }
                    _ => break,
                },
            }
        }
        declarations
    }

    /// Parse a descendant selector chain up to `{` or end of input.
    ///
    /// `a b c` nests to the right, as `a (b c)`: `b c` must match the node,
    /// and `a` must match one of its ancestors.
    ///
    /// # Errors
    ///
    /// Returns [`CssParseError::ExpectedWord`] if no tag word is present.
    pub fn selector(&mut self) -> Result<Selector, CssParseError> {
        let mut innermost = Selector::Tag(self.word()?.to_lowercase());
        let mut ancestors = Vec::new();
        self.whitespace();
        while !self.at_end() && self.peek() != Some('{') {
            let next = Selector::Tag(self.word()?.to_lowercase());
            ancestors.push(mem::replace(&mut innermost, next));
            self.whitespace();
        }
        Ok(ancestors
            .into_iter()
            .rev()
            .fold(innermost, |descendant, ancestor| Selector::Descendant {
                ancestor: Box::new(ancestor),
                descendant: Box::new(descendant),
            }))
    }

    fn rule(&mut self) -> Result<Rule, CssParseError> {
        self.whitespace();
        let selector = self.selector()?;
        self.literal('{')?;
        self.whitespace();
        let declarations = self.body();
        self.literal('}')?;
        Ok(Rule {
            selector,
            declarations,
        })
    }

    /// Parse a whole stylesheet.
    pub fn parse(&mut self) -> Vec<Rule> {
        let mut rules = Vec::new();
        self.whitespace();
        while !self.at_end() {
            match self.rule() {
                Ok(rule) => rules.push(rule),
                Err(_) => {
                    if self.ignore_until(&['}']).is_none() {
                        break;
                    }
                    self.i += 1;
                }
            }
            self.whitespace();
        }
        rules
    }
}

/// Parse stylesheet text into rules, in source order.
#[must_use]
pub fn parse_stylesheet(source: &str) -> Vec<Rule> {
    CSSParser::new(source).parse()
}

/// Parse the contents of a `style` attribute.
#[must_use]
pub fn parse_declarations(source: &str) -> Vec<Declaration> {
    CSSParser::new(source).body()
}

/// Parse a selector such as `div p`.
///
/// # Errors
///
/// Fails if the text is empty, contains non-word characters, or continues
/// past the selector (for example with a `{`).
pub fn parse_selector(source: &str) -> Result<Selector, CssParseError> {
    let mut parser = CSSParser::new(source.trim());
    let selector = parser.selector()?;
    match parser.peek() {
        None => Ok(selector),
        Some(found) => Err(CssParseError::Unexpected {
            found,
            offset: parser.i,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_recovers_from_bad_declaration() {
        let declarations = parse_declarations("color: red; margin 4px; font-size: 12px;");
        let pairs: Vec<(&str, &str)> = declarations
            .iter()
            .map(|d| (d.property.as_str(), d.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("color", "red"), ("font-size", "12px")]);
    }

    #[test]
    fn test_last_declaration_may_omit_semicolon() {
        let declarations = parse_declarations("COLOR: red; background-color: blue");
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0].property, "color");
        assert_eq!(declarations[1].value, "blue");

        let rules = parse_stylesheet("p { color: red }");
        assert_eq!(rules[0].declarations.len(), 1);
    }

    #[test]
    fn test_missing_semicolon_keeps_pair_and_skips_rest() {
        let declarations = parse_declarations("color: red font-size: 12px; margin: 0;");
        let pairs: Vec<(&str, &str)> = declarations
            .iter()
            .map(|d| (d.property.as_str(), d.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("color", "red"), ("margin", "0")]);
    }

    #[test]
    fn test_multi_word_value_keeps_first_word() {
        let declarations = parse_declarations("border: 1px solid black; color: red;");
        let pairs: Vec<(&str, &str)> = declarations
            .iter()
            .map(|d| (d.property.as_str(), d.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("border", "1px"), ("color", "red")]);
    }

    #[test]
    fn test_selector_chain_nests_to_the_right() {
        let selector = parse_selector("span div p").expect("valid selector");
        let tag = |name: &str| Box::new(Selector::Tag(name.to_string()));
        assert_eq!(
            selector,
            Selector::Descendant {
                ancestor: tag("span"),
                descendant: Box::new(Selector::Descendant {
                    ancestor: tag("div"),
                    descendant: tag("p"),
                }),
            }
        );
    }

    #[test]
    fn test_stylesheet_rules_in_order() {
        let rules = parse_stylesheet("p { color: red; }\n div p { color: blue; font-weight: bold; }");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].priority(), 1);
        assert_eq!(rules[1].priority(), 2);
        assert_eq!(rules[1].declarations.len(), 2);
    }

    #[test]
    fn test_stylesheet_skips_malformed_rule() {
        let rules = parse_stylesheet("a:hover { color: red; } b { font-weight: bold; }");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selector, Selector::Tag("b".to_string()));
    }

    #[test]
    fn test_parse_selector_rejects_trailing_input() {
        assert!(parse_selector("div p").is_ok());
        assert!(parse_selector("").is_err());
        assert!(parse_selector("div > p").is_err());
    }
}

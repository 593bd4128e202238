//! Tag-soup HTML parsing for the Wombat engine.
//!
//! # Scope
//!
//! This crate implements a permissive, never-failing markup parser:
//! - **Tokenizer**: a two-state (`in text` / `in tag`) character scan that
//!   yields start tags, end tags and text runs
//! - **Tree builder**: a stack of open elements plus implicit `<html>`,
//!   `<head>`, `<body>` and `</head>` insertion
//!
//! # Not Implemented
//!
//! - Character references
//! - Comments containing `>`
//! - Raw text elements (`<script>` and `<style>` bodies are scanned for tags)
//! - Auto-closing of unclosed block elements

/// Tree construction.
pub mod parser;
/// Tokenization into tags and text.
pub mod tokenizer;

pub use parser::{HTMLParser, format_tree, parse, parse_fragment};
pub use tokenizer::{HTMLTokenizer, Token};

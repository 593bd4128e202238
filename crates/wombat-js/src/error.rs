//! Script bridge errors.

use thiserror::Error;
use wombat_common::NetworkError;
use wombat_css::CssParseError;

/// Failure surfaced by the script bridge.
///
/// Inside host functions these become thrown JavaScript `Error`s carrying the
/// [`Display`](std::fmt::Display) text; outside the interpreter they are
/// returned to the caller.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// An uncaught exception or a syntax error in a script.
    #[error("{0}")]
    Runtime(String),
    /// A CSP or same-origin check failed. The request was never sent.
    #[error("{0}")]
    SecurityViolation(String),
    /// The network collaborator failed.
    #[error(transparent)]
    Network(#[from] NetworkError),
    /// `querySelectorAll` was given a selector the engine cannot parse.
    #[error("invalid selector: {0}")]
    InvalidSelector(#[from] CssParseError),
    /// A script referred to a node handle the bridge never issued.
    #[error("unknown node handle {0}")]
    UnknownHandle(u32),
}

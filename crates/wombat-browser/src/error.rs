//! Navigation errors.

use thiserror::Error;
use wombat_common::NetworkError;

/// A top-level document could not be loaded.
///
/// Sub-resource failures (stylesheets, scripts) never surface here; they are
/// reported as warnings and skipped.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document fetch failed.
    #[error(transparent)]
    Network(#[from] NetworkError),
    /// The address could not be parsed as a URL.
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),
}

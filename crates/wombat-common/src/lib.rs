//! Common utilities for the Wombat engine.
//!
//! This crate provides shared infrastructure used by all engine components:
//! - **Warning System** - colored terminal output for recovered failures
//! - **URLs** - resolution and origin computation
//! - **Networking** - the `Fetcher` collaborator, HTTP client and cookie jar
//! - **Security** - the Content-Security-Policy allow-list
//! - **Tasks** - the single-consumer task queue fed by background threads

pub mod csp;
pub mod net;
pub mod tasks;
pub mod url;
pub mod warning;

pub use csp::ContentSecurityPolicy;
pub use net::{Fetcher, HttpFetcher, NetworkError, Response};
pub use tasks::{Task, TaskRunner};
pub use url::{Url, origin, parse_url, resolve};

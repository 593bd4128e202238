//! Script bridge for the Wombat engine.
//!
//! Uses [Boa](https://boajs.dev/) as the JavaScript engine.
//!
//! Page scripts see a small DOM shim (`runtime.js`) which forwards every
//! operation to six native host functions:
//!
//! | Host function      | Behavior                                               |
//! |--------------------|--------------------------------------------------------|
//! | `log`              | print a console line                                   |
//! | `querySelectorAll` | match a selector against the whole document            |
//! | `getAttribute`     | read an attribute of a node handle                     |
//! | `setInnerHTML`     | replace an element's children with parsed markup       |
//! | `sendXHR`          | synchronous, CSP-checked, same-origin fetch            |
//! | `setTimeout`       | post a timer task to the main-thread queue after a delay |
//!
//! Nodes cross the boundary as integer handles (see [`HandleTable`]).
//!
//! # Example
//!
//! ```ignore
//! let document = DocumentState::new(tree, url, csp).into_shared();
//! let mut js = JsContext::new(document, fetcher, TaskRunner::new())?;
//! js.run("inline script #1", "console.log('hello')")?;
//! ```
//!
//! # Not Implemented
//!
//! - Asynchronous XHR
//! - `clearTimeout`, `setInterval`
//! - Event propagation beyond the target node

mod bridge;
mod context;
mod document;
mod error;
mod handles;
mod host;

pub use context::JsContext;
pub use document::{DocumentState, SharedDocument};
pub use error::ScriptError;
pub use handles::HandleTable;

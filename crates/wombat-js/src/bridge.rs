//! Host-side implementation of the script API.
//!
//! [`Bridge`] holds everything the host functions need: the shared document,
//! the handle table, the network collaborator and the task queue timers post
//! to. It knows nothing about the interpreter, so each operation is a plain
//! Rust method returning [`ScriptError`] on failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use wombat_common::url::{origin, resolve};
use wombat_common::warning::warn;
use wombat_common::{Fetcher, Task, TaskRunner};
use wombat_css::parse_selector;
use wombat_dom::NodeId;
use wombat_html::parse_fragment;

use crate::context::JsContext;
use crate::document::SharedDocument;
use crate::error::ScriptError;
use crate::handles::HandleTable;

/// State behind the `__host` functions of one document.
pub(crate) struct Bridge {
    pub(crate) document: SharedDocument,
    pub(crate) handles: HandleTable,
    fetcher: Arc<dyn Fetcher>,
    tasks: TaskRunner<JsContext>,
    discarded: Arc<AtomicBool>,
    console: Vec<String>,
}

impl Bridge {
    pub(crate) fn new(
        document: SharedDocument,
        fetcher: Arc<dyn Fetcher>,
        tasks: TaskRunner<JsContext>,
    ) -> Self {
        Self {
            document,
            handles: HandleTable::new(),
            fetcher,
            tasks,
            discarded: Arc::new(AtomicBool::new(false)),
            console: Vec::new(),
        }
    }

    pub(crate) fn discarded(&self) -> &Arc<AtomicBool> {
        &self.discarded
    }

    pub(crate) fn console(&self) -> &[String] {
        &self.console
    }

    /// `console.log`: print and remember the line.
    pub(crate) fn log(&mut self, line: String) {
        println!("[JS] {line}");
        self.console.push(line);
    }

    /// [§ 4.2.6 `querySelectorAll`](https://dom.spec.whatwg.org/#dom-parentnode-queryselectorall)
    ///
    /// Handles of every node in the document matching `selector`, in tree
    /// order.
    pub(crate) fn query_selector_all(&mut self, selector: &str) -> Result<Vec<u32>, ScriptError> {
        let selector = parse_selector(selector)?;
        let document = self.document.borrow();
        let tree = &document.tree;
        let matches: Vec<NodeId> = tree
            .iter_all()
            .into_iter()
            .filter(|&id| selector.matches(tree, id))
            .collect();
        drop(document);
        Ok(matches
            .into_iter()
            .map(|id| self.handles.handle_for(id))
            .collect())
    }

    /// [§ 4.9 `getAttribute`](https://dom.spec.whatwg.org/#dom-element-getattribute)
    pub(crate) fn get_attribute(&self, handle: u32, name: &str) -> Result<Option<String>, ScriptError> {
        let node = self.node(handle)?;
        let document = self.document.borrow();
        Ok(document.tree.attribute(node, name).map(str::to_string))
    }

    /// [§ 3.5.1 `innerHTML`](https://html.spec.whatwg.org/multipage/dynamic-markup-insertion.html#dom-element-innerhtml)
    ///
    /// Parse `html` as body content and replace the element's children with
    /// the result. The document is flagged for re-rendering.
    pub(crate) fn set_inner_html(&mut self, handle: u32, html: &str) -> Result<(), ScriptError> {
        let node = self.node(handle)?;
        let (fragment, body) = parse_fragment(html);
        let mut document = self.document.borrow_mut();
        let children = fragment
            .children(body)
            .iter()
            .filter_map(|&child| document.tree.import_subtree(&fragment, child))
            .collect();
        document.tree.replace_children(node, children);
        document.needs_render = true;
        Ok(())
    }

    /// Synchronous `XMLHttpRequest.send`.
    ///
    /// The URL must pass the document's CSP allow-list and be same-origin with
    /// the document. Both checks run before anything is sent.
    pub(crate) fn send_xhr(
        &self,
        method: &str,
        url: &str,
        body: Option<&str>,
    ) -> Result<String, ScriptError> {
        let document_url = self.document.borrow().url.clone();
        let full_url = resolve(&document_url, url)?;
        if !self.document.borrow().csp.allowed(&full_url) {
            return Err(ScriptError::SecurityViolation(
                "Cross-origin XHR blocked by CSP".to_string(),
            ));
        }
        if origin(&full_url) != origin(&document_url) {
            return Err(ScriptError::SecurityViolation(
                "Cross-origin XHR request not allowed".to_string(),
            ));
        }
        let payload = if method.eq_ignore_ascii_case("GET") {
            None
        } else {
            body
        };
        let response = self.fetcher.fetch(&full_url, Some(&document_url), payload)?;
        Ok(response.body)
    }

    /// [§ 8.6 Timers](https://html.spec.whatwg.org/multipage/timers-and-user-prompts.html#timers)
    ///
    /// Start a background thread that sleeps for `delay` and then posts a
    /// task running timeout `handle`. A timer whose document has been
    /// discarded in the meantime is dropped without running.
    pub(crate) fn set_timeout(&self, handle: u32, delay: Duration) {
        let tasks = self.tasks.clone();
        let discarded = Arc::clone(&self.discarded);
        let _ = thread::spawn(move || {
            thread::sleep(delay);
            if discarded.load(Ordering::Acquire) {
                return;
            }
            tasks.schedule_task(Task::new(move |js: &mut JsContext| {
                if discarded.load(Ordering::Acquire) {
                    return;
                }
                if let Err(error) = js.dispatch_timer(handle) {
                    warn("JS", &format!("setTimeout callback failed: {error}"));
                }
            }));
        });
    }

    fn node(&self, handle: u32) -> Result<NodeId, ScriptError> {
        self.handles
            .node(handle)
            .ok_or(ScriptError::UnknownHandle(handle))
    }
}

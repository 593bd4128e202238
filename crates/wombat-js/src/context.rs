//! Per-document JavaScript context.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use boa_engine::{Context, JsError, JsString, JsValue, Source, js_string};
use wombat_common::{Fetcher, TaskRunner};
use wombat_dom::NodeId;

use crate::bridge::Bridge;
use crate::document::SharedDocument;
use crate::error::ScriptError;
use crate::host::{ActiveBridge, register_host};

/// The DOM shim evaluated before any page script.
const RUNTIME_JS: &str = include_str!("runtime.js");

/// A Boa context bound to one document.
///
/// [§ 8.1.3.1 Realms](https://html.spec.whatwg.org/multipage/webappapis.html#realms-settings-objects-global-objects)
///
/// Created when a document finishes parsing and discarded when the tab
/// navigates away. A discarded context silently drops timers that fire after
/// the fact.
pub struct JsContext {
    context: Context,
    bridge: Rc<RefCell<Bridge>>,
}

impl JsContext {
    /// Create a context for `document` and evaluate the runtime shim.
    ///
    /// `tasks` is the queue timer callbacks are posted to; the owner drains it
    /// on the main thread with [`TaskRunner::run_once`].
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Runtime`] if the host object cannot be
    /// registered or the shim fails to evaluate.
    pub fn new(
        document: SharedDocument,
        fetcher: Arc<dyn Fetcher>,
        tasks: TaskRunner<Self>,
    ) -> Result<Self, ScriptError> {
        let mut context = Context::default();
        register_host(&mut context).map_err(runtime_error("host"))?;
        let mut js = Self {
            context,
            bridge: Rc::new(RefCell::new(Bridge::new(document, fetcher, tasks))),
        };
        js.run("runtime.js", RUNTIME_JS)?;
        Ok(js)
    }

    /// Evaluate a script. `name` identifies it in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Runtime`] for syntax errors and uncaught
    /// exceptions.
    pub fn run(&mut self, name: &str, code: &str) -> Result<(), ScriptError> {
        let _active = ActiveBridge::enter(Rc::clone(&self.bridge));
        let _ = self
            .context
            .eval(Source::from_bytes(code))
            .map_err(runtime_error(name))?;
        Ok(())
    }

    /// [§ 2.9 Dispatching events](https://dom.spec.whatwg.org/#dispatching-events)
    ///
    /// Run the listeners registered for `event_type` on `node` and return
    /// whether the default action should proceed (no listener called
    /// `preventDefault`).
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Runtime`] if a listener throws.
    pub fn dispatch_event(&mut self, event_type: &str, node: NodeId) -> Result<bool, ScriptError> {
        let handle = self.handle_for(node);
        let args = [JsValue::from(handle), JsString::from(event_type).into()];
        let result = self.call_global(js_string!("__dispatchEvent"), &args, event_type)?;
        Ok(result.to_boolean())
    }

    /// Run the `setTimeout` callback registered under `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Runtime`] if the callback throws.
    pub fn dispatch_timer(&mut self, handle: u32) -> Result<(), ScriptError> {
        if self.is_discarded() {
            return Ok(());
        }
        let _ = self.call_global(js_string!("__runTimeout"), &[JsValue::from(handle)], "setTimeout")?;
        Ok(())
    }

    /// Synchronous XHR from the host side, with the same checks scripts get.
    ///
    /// # Errors
    ///
    /// [`ScriptError::SecurityViolation`] if the URL fails the CSP or
    /// same-origin check, [`ScriptError::Network`] if the fetch fails.
    pub fn send_xhr(&self, method: &str, url: &str, body: Option<&str>) -> Result<String, ScriptError> {
        self.bridge.borrow().send_xhr(method, url, body)
    }

    /// The script handle for `node`, allocating one if needed.
    #[must_use]
    pub fn handle_for(&self, node: NodeId) -> u32 {
        self.bridge.borrow_mut().handles.handle_for(node)
    }

    /// The node a script handle refers to.
    #[must_use]
    pub fn node_for(&self, handle: u32) -> Option<NodeId> {
        self.bridge.borrow().handles.node(handle)
    }

    /// The document this context is bound to.
    #[must_use]
    pub fn document(&self) -> SharedDocument {
        Rc::clone(&self.bridge.borrow().document)
    }

    /// Lines logged through `console.log`, oldest first.
    #[must_use]
    pub fn console_output(&self) -> Vec<String> {
        self.bridge.borrow().console().to_vec()
    }

    /// Mark the document as replaced. Pending timers are dropped.
    pub fn discard(&self) {
        self.bridge.borrow().discarded().store(true, Ordering::Release);
    }

    /// Whether [`discard`](Self::discard) has been called.
    #[must_use]
    pub fn is_discarded(&self) -> bool {
        self.bridge.borrow().discarded().load(Ordering::Acquire)
    }

    fn call_global(
        &mut self,
        name: JsString,
        args: &[JsValue],
        what: &str,
    ) -> Result<JsValue, ScriptError> {
        let _active = ActiveBridge::enter(Rc::clone(&self.bridge));
        let global = self.context.global_object();
        let function = global
            .get(name, &mut self.context)
            .map_err(runtime_error(what))?;
        let Some(callable) = function.as_callable() else {
            return Err(ScriptError::Runtime(format!("{what}: runtime entry point missing")));
        };
        callable
            .call(&JsValue::undefined(), args, &mut self.context)
            .map_err(runtime_error(what))
    }
}

impl std::fmt::Debug for JsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsContext")
            .field("discarded", &self.is_discarded())
            .finish_non_exhaustive()
    }
}

fn runtime_error(name: &str) -> impl Fn(JsError) -> ScriptError + '_ {
    move |error| ScriptError::Runtime(format!("{name}: {error}"))
}

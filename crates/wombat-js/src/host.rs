//! The `__host` object: native functions the runtime shim calls into.
//!
//! Native functions are plain `fn` pointers, so they cannot capture the
//! bridge. Instead [`JsContext`](crate::JsContext) pushes its bridge onto a
//! thread-local stack for the duration of every call into the interpreter,
//! and the functions below operate on the top of that stack.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use boa_engine::object::ObjectInitializer;
use boa_engine::object::builtins::JsArray;
use boa_engine::property::Attribute;
use boa_engine::{
    Context, JsArgs, JsNativeError, JsResult, JsString, JsValue, NativeFunction, js_string,
};

use crate::bridge::Bridge;
use crate::error::ScriptError;

thread_local! {
    static ACTIVE: RefCell<Vec<Rc<RefCell<Bridge>>>> = const { RefCell::new(Vec::new()) };
}

/// Marks a bridge as the target of host calls until dropped.
pub(crate) struct ActiveBridge;

impl ActiveBridge {
    pub(crate) fn enter(bridge: Rc<RefCell<Bridge>>) -> Self {
        ACTIVE.with(|active| active.borrow_mut().push(bridge));
        Self
    }
}

impl Drop for ActiveBridge {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            let _ = active.borrow_mut().pop();
        });
    }
}

fn with_bridge<R>(f: impl FnOnce(&mut Bridge) -> Result<R, ScriptError>) -> JsResult<R> {
    let bridge = ACTIVE
        .with(|active| active.borrow().last().cloned())
        .ok_or_else(|| JsNativeError::error().with_message("no active document"))?;
    let mut bridge = bridge
        .try_borrow_mut()
        .map_err(|_| JsNativeError::error().with_message("re-entrant host call"))?;
    f(&mut bridge).map_err(|error| JsNativeError::error().with_message(error.to_string()).into())
}

fn string_arg(args: &[JsValue], index: usize, context: &mut Context) -> JsResult<String> {
    Ok(args
        .get_or_undefined(index)
        .to_string(context)?
        .to_std_string_escaped())
}

/// Register `__host` on the global object.
pub(crate) fn register_host(context: &mut Context) -> JsResult<()> {
    let host = ObjectInitializer::new(context)
        .function(NativeFunction::from_fn_ptr(host_log), js_string!("log"), 1)
        .function(
            NativeFunction::from_fn_ptr(host_query_selector_all),
            js_string!("querySelectorAll"),
            1,
        )
        .function(
            NativeFunction::from_fn_ptr(host_get_attribute),
            js_string!("getAttribute"),
            2,
        )
        .function(
            NativeFunction::from_fn_ptr(host_set_inner_html),
            js_string!("setInnerHTML"),
            2,
        )
        .function(NativeFunction::from_fn_ptr(host_send_xhr), js_string!("sendXHR"), 3)
        .function(
            NativeFunction::from_fn_ptr(host_set_timeout),
            js_string!("setTimeout"),
            2,
        )
        .build();
    context.register_global_property(js_string!("__host"), host, Attribute::all())
}

fn host_log(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let line = string_arg(args, 0, context)?;
    with_bridge(|bridge| {
        bridge.log(line);
        Ok(())
    })?;
    Ok(JsValue::undefined())
}

fn host_query_selector_all(
    _this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let selector = string_arg(args, 0, context)?;
    let handles = with_bridge(|bridge| bridge.query_selector_all(&selector))?;
    let values = handles.into_iter().map(JsValue::from);
    Ok(JsArray::from_iter(values, context).into())
}

fn host_get_attribute(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let handle = args.get_or_undefined(0).to_u32(context)?;
    let name = string_arg(args, 1, context)?;
    let value = with_bridge(|bridge| bridge.get_attribute(handle, &name))?;
    Ok(value.map_or_else(JsValue::null, |value| JsString::from(value.as_str()).into()))
}

fn host_set_inner_html(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let handle = args.get_or_undefined(0).to_u32(context)?;
    let html = string_arg(args, 1, context)?;
    with_bridge(|bridge| bridge.set_inner_html(handle, &html))?;
    Ok(JsValue::undefined())
}

fn host_send_xhr(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let method = string_arg(args, 0, context)?;
    let url = string_arg(args, 1, context)?;
    let body = match args.get_or_undefined(2) {
        value if value.is_null_or_undefined() => None,
        value => Some(value.to_string(context)?.to_std_string_escaped()),
    };
    let response = with_bridge(|bridge| bridge.send_xhr(&method, &url, body.as_deref()))?;
    Ok(JsString::from(response.as_str()).into())
}

fn host_set_timeout(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let handle = args.get_or_undefined(0).to_u32(context)?;
    let millis = args.get_or_undefined(1).to_number(context)?;
    let delay = if millis.is_finite() && millis > 0.0 {
        Duration::from_secs_f64(millis / 1000.0)
    } else {
        Duration::ZERO
    };
    with_bridge(|bridge| {
        bridge.set_timeout(handle, delay);
        Ok(())
    })?;
    Ok(JsValue::undefined())
}

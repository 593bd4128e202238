//! Engine warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the parsers, the cascade, the script bridge and the tab loader to
//! report recovered failures: skipped sub-resources, blocked requests,
//! crashed scripts and unsupported style values.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about an unsupported feature (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("CSS", "unsupported font-size '1.5em'");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        print_warning(component, message);
    }
}

/// Report a failure every time it happens.
///
/// Used for per-event reports where repetition is meaningful, e.g. a script
/// that crashes on every timer tick.
pub fn warn(component: &str, message: &str) {
    print_warning(component, message);
}

fn print_warning(component: &str, message: &str) {
    let line = format!("[Wombat {component}] ⚠ {message}");
    eprintln!("{}", line.yellow());
}

/// Clear all recorded warnings (call when loading a new page)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

//! Component warnings with colored terminal output.
//!
//! Provides deduplication so a hot path that keeps tripping over the same
//! condition (a style value the box tree ignores, an invariant that is
//! tolerated in release builds) reports it only once.

use std::collections::HashSet;
use std::sync::Mutex;

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Records `message` for `component`, returning `true` the first time the
/// pair is seen.
fn record(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let mut guard = match WARNED.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard.get_or_insert_with(HashSet::new).insert(key)
}

/// Warn about a tolerated condition (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("BoxEditor", "set_bounds called outside of layout");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if record(component, message) {
        eprintln!("{}", format!("[Lumen {component}] ⚠ {message}").yellow());
    }
}

/// Returns `true` if `message` has already been reported for `component`.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let guard = match WARNED.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard.as_ref().is_some_and(|set| set.contains(&key))
}

/// Clear all recorded warnings (call when tearing down a box tree)
pub fn clear_warnings() {
    let mut guard = match WARNED.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

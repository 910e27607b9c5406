//! Programmer-error invariant reporting.
//!
//! The box tree treats a broken invariant (cyclic attachment, double
//! parenting, mutating outside the permitted phase) as a bug in the calling
//! component, never as a value to hand back. In debug builds the report
//! panics at the call site; in release builds it is printed once and the
//! caller skips the offending operation.

use crate::warning::warn_once;

/// Report a violated invariant.
///
/// # Panics
///
/// Panics when `debug_assertions` are enabled.
#[track_caller]
pub fn invariant_violated(component: &str, message: &str) {
    if cfg!(debug_assertions) {
        panic!("[{component}] invariant violated: {message}");
    }
    warn_once(component, message);
}

/// Check `condition`, reporting `message` through [`invariant_violated`]
/// when it does not hold.
///
/// Returns `condition` so callers can bail out in release builds:
///
/// ```ignore
/// if !ensure(!is_attached, "BoxEditor", "child already has a parent") {
///     return;
/// }
/// ```
#[track_caller]
pub fn ensure(condition: bool, component: &str, message: &str) -> bool {
    if !condition {
        invariant_violated(component, message);
    }
    condition
}

//! Fallback-chain helpers
//!
//! Runtime probes, isolation roots and icon names are all ordered lists of
//! candidates evaluated lazily with early exit. Side calls whose failure does
//! not matter (cache refreshes, removals before a reinstall) go through
//! [`best_effort`] so their errors are traced and dropped in one place.

use std::fmt;

use tracing::debug;

/// Evaluate `candidates` in order and return the first value `check` yields.
///
/// `check` is not called for candidates after the first match.
pub fn first_match<T, U, I, F>(what: &str, candidates: I, mut check: F) -> Option<U>
where
    T: fmt::Debug,
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> Option<U>,
{
    for candidate in candidates {
        if let Some(found) = check(&candidate) {
            debug!(what, ?candidate, "matched");
            return Some(found);
        }
        debug!(what, ?candidate, "no match");
    }
    None
}

/// Run `op`, tracing and discarding any failure
pub fn best_effort<T, E, F>(what: &str, op: F) -> Option<T>
where
    E: fmt::Display,
    F: FnOnce() -> Result<T, E>,
{
    match op() {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(what, error = %e, "ignored failure");
            None
        }
    }
}

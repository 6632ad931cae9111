//! Panic containment around calls into collaborators.

use std::panic::{AssertUnwindSafe, catch_unwind};

/// Run `f`, turning a panic into `None`.
///
/// `what` names the collaborator call in the warning that is logged.
pub(crate) fn contain<T>(what: &'static str, f: impl FnOnce() -> T) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                .unwrap_or("non-string panic payload");
            tracing::warn!(call = what, reason, "collaborator panicked during announce ingestion");
            None
        }
    }
}

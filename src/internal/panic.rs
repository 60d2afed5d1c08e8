//! Panic isolation helpers.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Runs `f`, converting a panic into `Err(message)`.
///
/// The closure is asserted unwind-safe: a callback that panics while holding
/// a lock on shared state may leave that state poisoned or half-updated.
pub(crate) fn catch<T, F>(f: F) -> Result<T, String>
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

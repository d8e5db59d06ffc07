//! # Task abstractions.
//!
//! - [`Task`] - trait for one-shot, cancelable consumer logic
//! - [`TaskFn`] - closure-based task implementation
//! - [`TaskRef`] - owned, type-erased task (`Box<dyn Task>`)
//! - [`TaskHandle`] - handle to a scheduled task and its [`TaskOutcome`]

mod handle;
mod task;
mod task_fn;

pub(crate) use handle::TaskShared;
pub use handle::{TaskHandle, TaskOutcome};
pub use task::{BoxTaskFuture, Task, TaskRef};
pub use task_fn::TaskFn;

use std::any::Any;

/// Extracts a printable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

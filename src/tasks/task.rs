//! # Task abstraction.
//!
//! This module defines the [`Task`] trait: a named, one-shot, cancelable unit
//! of consumer logic. A task is consumed when it runs, so it may own what it
//! works on (typically a [`Subscription`](crate::Subscription)).
//!
//! A task receives a [`CancellationToken`]. The supervisor interrupts it at its
//! next `.await` when cancelled, so checking the token is only needed around
//! long synchronous sections.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Boxed future returned by [`Task::run`].
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// Owned, type-erased task.
pub type TaskRef = Box<dyn Task>;

/// # Asynchronous, cancelable unit of consumer logic.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use streamvisor::{BoxTaskFuture, Subscription, Task};
///
/// struct Printer(Subscription<String>);
///
/// impl Task for Printer {
///     fn name(&self) -> &str { "printer" }
///
///     fn run(self: Box<Self>, _ctx: CancellationToken) -> BoxTaskFuture {
///         let mut sub = self.0;
///         Box::pin(async move {
///             while let Some(line) = sub.recv().await {
///                 println!("{line}");
///             }
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Task: Send + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Consumes the task and produces the future that executes it.
    fn run(self: Box<Self>, ctx: CancellationToken) -> BoxTaskFuture;
}

impl Task for Box<dyn Task> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(self: Box<Self>, ctx: CancellationToken) -> BoxTaskFuture {
        <dyn Task as Task>::run(*self, ctx)
    }
}

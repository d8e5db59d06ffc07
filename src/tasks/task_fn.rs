//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: FnOnce(CancellationToken) -> Fut`. The closure
//! runs once, so it may move a [`Subscription`](crate::Subscription) or any other
//! owned state into the future it returns.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use streamvisor::{Streamer, Task, TaskFn, TaskError};
//!
//! let streamer: Streamer<u32> = Streamer::new();
//! let mut sub = streamer.subscribe();
//!
//! let t = TaskFn::new("collector", move |_ctx: CancellationToken| async move {
//!     while let Some(n) = sub.recv().await {
//!         let _ = n;
//!     }
//!     Ok::<_, TaskError>(())
//! });
//!
//! assert_eq!(t.name(), "collector");
//! ```

use std::borrow::Cow;
use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::{BoxTaskFuture, Task, TaskRef};

/// Function-backed task implementation.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F, Fut> TaskFn<F>
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    /// Creates the task and returns it type-erased as a [`TaskRef`].
    pub fn boxed(name: impl Into<Cow<'static, str>>, f: F) -> TaskRef {
        Box::new(Self::new(name, f))
    }
}

impl<F, Fut> Task for TaskFn<F>
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(self: Box<Self>, ctx: CancellationToken) -> BoxTaskFuture {
        Box::pin((self.f)(ctx))
    }
}

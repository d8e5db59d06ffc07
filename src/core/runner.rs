//! # Run one managed task.
//!
//! [`supervise`] is the body of every task spawned by the registry:
//!
//! ```text
//! supervise(task)
//!   ├─► first poll: select!(biased; cancelled ─► Canceled, task.run(ctx))
//!   │      └─► resolve start handshake        (schedule() may return now)
//!   ├─► later polls until the task finishes or is cancelled
//!   └─► Finish guard (drop, runs on every exit path incl. abort):
//!          ├─ record outcome (Canceled if none)
//!          ├─ forget from registry
//!          ├─ publish TaskStopped / TaskFailed / TaskCanceled
//!          └─ mark handle done
//! ```
//!
//! ## Rules
//! - The handshake resolves after the first poll, so whatever the task does before
//!   its first suspension point happens-before `schedule()` returns.
//! - Cancellation drops the task future at its current suspension point; owned
//!   subscriptions run their cleanup then.
//! - Panics are caught and become [`TaskError::Panicked`].

use std::future::{Future, poll_fn};
use std::panic::AssertUnwindSafe;
use std::pin::pin;

use futures::FutureExt;

use crate::completion::Resolver;
use crate::core::registry::WeakRegistry;
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{TaskHandle, TaskRef, panic_message};

/// Exit bookkeeping; runs when the wrapper completes or is dropped.
struct Finish {
    handle: TaskHandle,
    registry: WeakRegistry,
    bus: Bus,
}

impl Drop for Finish {
    fn drop(&mut self) {
        let inner = &self.handle.inner;
        inner.set_outcome(Err(TaskError::Canceled));
        self.registry.forget(self.handle.id());

        let name = self.handle.name();
        let ev = match self.handle.outcome() {
            Some(Ok(())) => Event::new(EventKind::TaskStopped).with_task(name),
            Some(Err(TaskError::Canceled)) | None => {
                Event::new(EventKind::TaskCanceled).with_task(name)
            }
            Some(Err(e)) => {
                tracing::debug!(task = name, error = %e, "managed task failed");
                Event::new(EventKind::TaskFailed)
                    .with_task(name)
                    .with_reason(e.to_string())
            }
        };
        self.bus.publish(ev);
        inner.mark_done();
    }
}

/// Runs `task` under supervision, resolving `started` after its first poll.
pub(crate) async fn supervise(
    task: TaskRef,
    handle: TaskHandle,
    started: Resolver<()>,
    registry: WeakRegistry,
    bus: Bus,
) {
    let _finish = Finish {
        handle: handle.clone(),
        registry,
        bus,
    };

    let ctx = handle.inner.token();
    let guarded = async move {
        let work = task.run(ctx.clone());
        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(TaskError::Canceled),
            res = work => res,
        }
    };

    let mut caught = pin!(AssertUnwindSafe(guarded).catch_unwind());
    let mut started = Some(started);
    let res = poll_fn(|cx| {
        let poll = caught.as_mut().poll(cx);
        if let Some(s) = started.take() {
            s.resolve(());
        }
        poll
    })
    .await;

    let outcome = res.unwrap_or_else(|panic| {
        Err(TaskError::Panicked {
            info: panic_message(panic.as_ref()),
        })
    });
    handle.inner.set_outcome(outcome);
}

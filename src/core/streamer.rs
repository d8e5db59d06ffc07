//! # Streamer: hot broadcast with per-push backpressure and supervised consumers.
//!
//! The [`Streamer`] owns the delivery/readiness registries, the subscriber set,
//! the task registry and the event bus.
//!
//! ## High-level architecture
//! ```text
//! producer                                         consumers (scheduled tasks)
//!   │                                                 │
//!   │ push(item)                                      │ sub.recv()
//!   ├─► fan-out: resolve every waiting delivery ─────►├─► Some(item) ─► process
//!   ├─► open round { recipients }                     │
//!   ├─► await round ◄─────── signal ready ────────────┘ (next recv)
//!   └─► return
//!
//! close()
//!   ├─► cancel + join every managed task (grace, then abort)
//!   └─► close every subscription, drop all registrations (waiting pushes return)
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use tokio_util::sync::CancellationToken;
//! use streamvisor::{Streamer, TaskError, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let streamer: Streamer<String> = Streamer::new();
//!     let seen = Arc::new(Mutex::new(Vec::new()));
//!
//!     // Nobody listens yet: returns immediately and the item is gone.
//!     streamer.push("no printers yet".to_string()).await;
//!
//!     let mut sub = streamer.subscribe();
//!     let sink = Arc::clone(&seen);
//!     streamer
//!         .schedule(TaskFn::new("printer", move |_ctx: CancellationToken| async move {
//!             while let Some(line) = sub.recv().await {
//!                 if let Ok(mut lines) = sink.lock() {
//!                     lines.push(line);
//!                 }
//!             }
//!             Ok::<(), TaskError>(())
//!         }))
//!         .await;
//!
//!     streamer.push("foo".to_string()).await;
//!     streamer.push("bar".to_string()).await;
//!     streamer.close().await?;
//!
//!     assert_eq!(*seen.lock().map_err(|e| e.to_string())?, vec!["foo", "bar"]);
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::core::builder::StreamerBuilder;
use crate::core::config::StreamerConfig;
use crate::core::state::{Shared, StreamerStats};
use crate::core::subscription::Subscription;
use crate::error::RuntimeError;
use crate::events::{Event, EventKind};
use crate::tasks::{Task, TaskHandle};

/// Removes a readiness round on every exit path of `push`.
struct RoundGuard<'a, T> {
    shared: &'a Shared<T>,
    id: u64,
}

impl<T> Drop for RoundGuard<'_, T> {
    fn drop(&mut self) {
        self.shared.lock().close_round(self.id);
    }
}

/// Hot multi-subscriber stream with per-push backpressure.
///
/// Cheap to clone; clones share the same stream.
pub struct Streamer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Streamer<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for Streamer<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Streamer<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a streamer with the default configuration and no observers.
    pub fn new() -> Self {
        StreamerBuilder::new(StreamerConfig::default()).build()
    }

    /// Returns a builder to attach observers or a custom configuration.
    pub fn builder(cfg: StreamerConfig) -> StreamerBuilder<T> {
        StreamerBuilder::new(cfg)
    }

    pub(crate) fn from_shared(shared: Arc<Shared<T>>) -> Self {
        Self { shared }
    }

    /// Configuration this streamer was built with.
    pub fn config(&self) -> &StreamerConfig {
        &self.shared.cfg
    }

    /// Creates a new subscription. Never waits.
    ///
    /// The subscription only receives items pushed while it is waiting inside
    /// [`Subscription::recv`]. After [`close`](Self::close) the returned
    /// subscription is already closed.
    pub fn subscribe(&self) -> Subscription<T> {
        let (id, joined) = self.shared.lock().join();
        if joined {
            tracing::debug!(subscription = id, "subscription opened");
            self.shared
                .bus
                .publish(Event::new(EventKind::SubscriptionOpened).with_subscription(id));
        }
        Subscription::new(id, Arc::clone(&self.shared), !joined)
    }

    /// Delivers `item` to every subscription currently waiting for one, then waits
    /// until each of them has come back for the next item (or left).
    ///
    /// Returns immediately when nobody received the item, and after `close()`.
    /// Cancel safe: dropping the future withdraws the wait; delivery already happened.
    pub async fn push(&self, item: T) {
        let (recipients, round) = {
            let mut state = self.shared.lock();
            if state.is_closed() {
                tracing::debug!("push after close ignored");
                return;
            }
            let recipients = state.broadcast(&item);
            let count = recipients.len();
            if !state.has_subscribers() || recipients.is_empty() {
                (count, None)
            } else {
                (count, Some(state.open_round(recipients)))
            }
        };
        drop(item);

        self.shared
            .bus
            .publish(Event::new(EventKind::ItemPushed).with_recipients(recipients));
        let Some((id, ready)) = round else {
            return;
        };

        let _round = RoundGuard {
            shared: &self.shared,
            id,
        };
        if ready.await.is_err() {
            tracing::debug!(recipients, "push released by close");
        }
        self.shared
            .bus
            .publish(Event::new(EventKind::PushReleased).with_recipients(recipients));
    }

    /// Runs `task` as a managed background task.
    ///
    /// Returns after the task has been polled once, so a consumer that starts by
    /// calling [`Subscription::recv`] is already waiting when this returns.
    /// Must be called within a tokio runtime.
    pub async fn schedule<K: Task>(&self, task: K) -> TaskHandle {
        let handle = self.shared.tasks.spawn(task, &self.shared.bus).await;
        tracing::debug!(task = handle.name(), "task scheduled");
        handle
    }

    /// Cancels every managed task, closes every subscription, and releases waiting pushes.
    ///
    /// Tasks get [`StreamerConfig::grace`] to exit after cancellation; stragglers are
    /// aborted and reported as [`RuntimeError::GraceExceeded`]. Safe to call more than once.
    pub async fn close(&self) -> Result<(), RuntimeError> {
        tracing::debug!("closing streamer");
        self.shared.bus.publish(Event::new(EventKind::CloseRequested));

        let grace = self.shared.cfg.grace_period();
        let (tasks, ()) = tokio::join!(
            self.shared.tasks.cancel_all(grace),
            self.close_subscriptions()
        );

        match &tasks {
            Ok(()) => self.shared.bus.publish(Event::new(EventKind::AllStoppedWithin)),
            Err(RuntimeError::GraceExceeded { stuck, .. }) => {
                tracing::warn!(aborted = ?stuck, "tasks exceeded shutdown grace");
                self.shared.bus.publish(
                    Event::new(EventKind::GraceExceeded).with_reason(stuck.join(",")),
                );
            }
        }
        tasks
    }

    async fn close_subscriptions(&self) {
        let ids = self.shared.lock().shutdown();
        self.shared.streams.cancel();
        for id in ids {
            self.shared
                .bus
                .publish(Event::new(EventKind::SubscriptionClosed).with_subscription(id));
        }
    }

    /// True once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.shared.lock().is_closed()
    }

    /// Current registry sizes.
    pub fn stats(&self) -> StreamerStats {
        let mut stats = self.shared.lock().stats();
        stats.tasks = self.shared.tasks.len();
        stats
    }
}

impl<T> fmt::Debug for Streamer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Streamer")
            .field("grace", &self.shared.cfg.grace)
            .finish_non_exhaustive()
    }
}

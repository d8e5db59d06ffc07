//! # Runtime events emitted by the streamer and its managed tasks.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Stream events**: subscriptions opening/closing, items pushed and released
//! - **Task events**: managed tasks scheduled and their terminal outcome
//! - **Shutdown events**: close requested, finished in time, grace exceeded
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name,
//! subscription id, recipient counts and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use streamvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("printer")
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("printer"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Stream events ===
    /// A subscription was created and joined the subscriber set.
    ///
    /// Sets:
    /// - `subscription`: subscription id
    SubscriptionOpened,

    /// A subscription left the subscriber set (dropped, closed, or streamer closed).
    ///
    /// Sets:
    /// - `subscription`: subscription id
    SubscriptionClosed,

    /// An item was fanned out to the waiting subscriptions.
    ///
    /// Sets:
    /// - `recipients`: number of subscriptions the item was delivered to
    ItemPushed,

    /// Every recipient of the last item came back for the next one; `push` returned.
    ///
    /// Sets:
    /// - `recipients`: number of subscriptions the barrier waited on
    PushReleased,

    // === Task events ===
    /// A managed task was spawned and reached its first suspension point.
    ///
    /// Sets:
    /// - `task`: task name
    TaskScheduled,

    /// A managed task finished on its own with `Ok(())`.
    ///
    /// Sets:
    /// - `task`: task name
    TaskStopped,

    /// A managed task returned an error or panicked.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: failure message
    TaskFailed,

    /// A managed task was interrupted by cancellation.
    ///
    /// Sets:
    /// - `task`: task name
    TaskCanceled,

    // === Shutdown events ===
    /// `close()` was called.
    CloseRequested,

    /// All managed tasks stopped within the configured grace period.
    AllStoppedWithin,

    /// Grace period exceeded; remaining tasks were aborted.
    ///
    /// Sets:
    /// - `reason`: names of the aborted tasks
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Subscription id, if applicable.
    pub subscription: Option<u64>,
    /// Number of subscriptions involved in a push.
    pub recipients: Option<u32>,
    /// Human-readable reason (errors, aborted task list, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            subscription: None,
            recipients: None,
            reason: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a subscription id.
    #[inline]
    pub fn with_subscription(mut self, id: u64) -> Self {
        self.subscription = Some(id);
        self
    }

    /// Attaches a recipient count (saturates at `u32::MAX`).
    #[inline]
    pub fn with_recipients(mut self, n: usize) -> Self {
        self.recipients = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    /// True for task terminal events.
    #[inline]
    pub fn is_task_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::TaskStopped | EventKind::TaskFailed | EventKind::TaskCanceled
        )
    }
}

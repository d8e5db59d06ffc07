//! # Observer: user-facing event handlers
//!
//! The [`Observer`] trait is the extension point for plugging custom event
//! handlers into the runtime: metrics export, alerting, structured logging.
//!
//! Each observer gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-observer bounded queue** (capacity via [`Observer::queue_capacity`])
//! - **Panic isolation** (panics are caught and logged)
//!
//! ```text
//! Streamer ── publish(Event) ──► Bus ──► observer_listener ──► ObserverSet
//!                                                  ┌─────────────┼─────────────┐
//!                                                  ▼             ▼             ▼
//!                                             [queue O1]    [queue O2]    [queue ON]
//!                                                  ▼             ▼             ▼
//!                                             on_event()    on_event()    on_event()
//! ```
//!
//! ## Rules
//! - A slow observer only affects its own queue; it never slows down `push`.
//! - Queue overflow drops the event **for this observer only**.
//! - Events are processed sequentially (FIFO) per observer.
//!
//! # Example: custom observer
//! ```no_run
//! use streamvisor::{Observer, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct PushCounter;
//!
//! #[async_trait]
//! impl Observer for PushCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if matches!(event.kind, EventKind::ItemPushed) {
//!             // increment a counter by event.recipients
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "push-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event observer for runtime observability.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Observer: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, not in the publisher context.
    async fn on_event(&self, event: &Event);

    /// Returns the observer name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose; override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this observer (clamped to a minimum of 1).
    ///
    /// Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}

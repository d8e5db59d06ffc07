//! # LogWriter: event renderer
//!
//! A minimal observer that renders incoming [`Event`]s through `tracing` at info level.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [subscription-opened] id=1
//! [scheduled] task="printer"
//! [pushed] recipients=1
//! [released] recipients=1
//! [close-requested]
//! [canceled] task="printer"
//! [subscription-closed] id=1
//! [all-stopped-within-grace]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::observers::Observer;

/// Event writer observer.
#[derive(Default, Debug, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Observer for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::SubscriptionOpened => {
                tracing::info!("[subscription-opened] id={:?}", e.subscription);
            }
            EventKind::SubscriptionClosed => {
                tracing::info!("[subscription-closed] id={:?}", e.subscription);
            }
            EventKind::ItemPushed => {
                tracing::info!("[pushed] recipients={:?}", e.recipients);
            }
            EventKind::PushReleased => {
                tracing::info!("[released] recipients={:?}", e.recipients);
            }
            EventKind::TaskScheduled => {
                tracing::info!("[scheduled] task={task:?}");
            }
            EventKind::TaskStopped => {
                tracing::info!("[stopped] task={task:?}");
            }
            EventKind::TaskFailed => {
                tracing::info!("[failed] task={task:?} err={:?}", e.reason);
            }
            EventKind::TaskCanceled => {
                tracing::info!("[canceled] task={task:?}");
            }
            EventKind::CloseRequested => {
                tracing::info!("[close-requested]");
            }
            EventKind::AllStoppedWithin => {
                tracing::info!("[all-stopped-within-grace]");
            }
            EventKind::GraceExceeded => {
                tracing::info!("[grace-exceeded] aborted={:?}", e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

//! # Handle to a managed task.
//!
//! [`TaskHandle`] is returned by [`Streamer::schedule`](crate::Streamer::schedule).
//! It is cheap to clone and outlives the task: after the task ends the handle
//! keeps its [`TaskOutcome`].
//!
//! ```text
//! scheduled ──► running ──┬─► completed   outcome = Ok(()) / Err(Fail)
//!                         ├─► cancelled   outcome = Err(Canceled)
//!                         └─► panicked    outcome = Err(Panicked)
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Final result of a managed task.
pub type TaskOutcome = Result<(), TaskError>;

pub(crate) struct TaskShared {
    id: u64,
    name: Arc<str>,
    cancel: CancellationToken,
    done: CancellationToken,
    outcome: Mutex<Option<TaskOutcome>>,
}

impl TaskShared {
    pub(crate) fn new(id: u64, name: Arc<str>, cancel: CancellationToken) -> Self {
        Self {
            id,
            name,
            cancel,
            done: CancellationToken::new(),
            outcome: Mutex::new(None),
        }
    }

    /// Records the outcome unless one is already set. Returns whether it was recorded.
    pub(crate) fn set_outcome(&self, outcome: TaskOutcome) -> bool {
        let mut slot = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return false;
        }
        *slot = Some(outcome);
        true
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub(crate) fn mark_done(&self) {
        self.done.cancel();
    }
}

/// Shared handle to a scheduled task.
#[derive(Clone)]
pub struct TaskHandle {
    pub(crate) inner: Arc<TaskShared>,
}

impl TaskHandle {
    pub(crate) fn id(&self) -> u64 {
        self.inner.id
    }

    /// Task name as given by [`Task::name`](crate::Task::name).
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Requests cancellation; the task is interrupted at its next suspension point.
    pub fn cancel(&self) {
        self.inner.cancel.cancel();
    }

    /// True once the task has exited for any reason.
    pub fn is_finished(&self) -> bool {
        self.inner.done.is_cancelled()
    }

    /// Outcome of the task, or `None` while it is still running.
    pub fn outcome(&self) -> Option<TaskOutcome> {
        self.inner
            .outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Waits until the task exits and returns its outcome.
    pub async fn wait(&self) -> TaskOutcome {
        self.inner.done.cancelled().await;
        self.outcome().unwrap_or(Err(TaskError::Canceled))
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("name", &self.name())
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_outcome_wins() {
        let shared = Arc::new(TaskShared::new(1, Arc::from("t"), CancellationToken::new()));
        let handle = TaskHandle {
            inner: Arc::clone(&shared),
        };
        assert!(handle.outcome().is_none());

        assert!(shared.set_outcome(Ok(())));
        assert!(!shared.set_outcome(Err(TaskError::Canceled)));
        shared.mark_done();

        assert!(handle.is_finished());
        assert_eq!(handle.wait().await, Ok(()));
    }
}

//! Error types used by the streamvisor runtime and its managed tasks.
//!
//! This module defines:
//!
//! - [`RuntimeError`]: errors raised by the coordinator itself during shutdown.
//! - [`TaskError`]: outcomes of a managed consumer task that did not simply finish.
//! - [`Abandoned`]: a completion whose every resolver was dropped unresolved.
//!
//! The enums provide helper methods (`as_label`, `as_message`) for logs/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the streamvisor runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Tasks did not stop within the grace period after cancellation and were aborted.
    #[error("shutdown timeout {grace:?} exceeded; aborted: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the tasks that had to be aborted.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use streamvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; aborted tasks={stuck:?}")
            }
        }
    }
}

/// # Errors produced by managed task execution.
///
/// Consumer logic returns `Fail` on its own; the supervisor produces
/// `Canceled` (interrupted by [`TaskHandle::cancel`](crate::TaskHandle::cancel) or
/// [`Streamer::close`](crate::Streamer::close)) and `Panicked`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Consumer logic failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task was interrupted at a suspension point.
    #[error("context cancelled")]
    Canceled,

    /// Consumer logic panicked; the panic was contained by the task wrapper.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use streamvisor::TaskError;
    ///
    /// let err = TaskError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
            TaskError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// True for [`TaskError::Canceled`].
    ///
    /// ```
    /// use streamvisor::TaskError;
    ///
    /// assert!(TaskError::Canceled.is_cancellation());
    /// assert!(!TaskError::Fail { error: "nope".into() }.is_cancellation());
    /// ```
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}

/// A completion was dropped by all of its resolvers before it was resolved.
///
/// Waiters treat this as a termination signal, never as a fault.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("completion abandoned before resolution")]
pub struct Abandoned;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
        assert_eq!(
            TaskError::Panicked { info: "x".into() }.as_label(),
            "task_panicked"
        );
        assert_eq!(TaskError::Fail { error: "x".into() }.as_label(), "task_failed");
    }

    #[test]
    fn test_grace_exceeded_message_lists_tasks() {
        let err = RuntimeError::GraceExceeded {
            grace: Duration::from_millis(10),
            stuck: vec!["printer".into()],
        };
        assert!(err.as_message().contains("printer"));
        assert!(err.to_string().contains("10ms"));
    }
}

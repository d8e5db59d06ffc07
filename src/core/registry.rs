//! # Task registry - the set of managed tasks eligible for cancellation.
//!
//! ## Architecture
//! ```text
//! Streamer::schedule(task)
//!   └─► TaskRegistry::spawn(task)
//!         ├─► JoinSet::spawn(runner::supervise(...))   (under the lock)
//!         └─► await handshake (task polled once)
//!
//! task exits (any path) ──► runner Finish guard ──► WeakRegistry::forget(id)
//!
//! Streamer::close()
//!   └─► TaskRegistry::cancel_all(grace)
//!         ├─► take handles + JoinSet → cancel tokens
//!         ├─► join_next until empty, within grace
//!         └─► abort_all, drain for at most ABORT_WAIT → RuntimeError::GraceExceeded
//! ```
//!
//! ## Rules
//! - The registry owns the `JoinSet`; callers get [`TaskHandle`]s.
//! - The lock is never held while a task future may be dropped (cancel/abort/join).
//! - Finished tasks are reaped from the `JoinSet` on the next spawn.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::completion;
use crate::core::runner;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{Task, TaskHandle, TaskShared};

/// Upper bound on waiting for aborted tasks to unwind after the grace period.
const ABORT_WAIT: Duration = Duration::from_millis(100);

#[derive(Default)]
struct Tracked {
    handles: HashMap<u64, TaskHandle>,
    set: JoinSet<()>,
}

struct RegistryInner {
    tracked: Mutex<Tracked>,
    next_id: AtomicU64,
}

impl RegistryInner {
    fn lock(&self) -> MutexGuard<'_, Tracked> {
        self.tracked.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registry of managed tasks.
pub(crate) struct TaskRegistry {
    inner: Arc<RegistryInner>,
}

/// Non-owning reference used by task wrappers to deregister themselves.
#[derive(Clone)]
pub(crate) struct WeakRegistry(Weak<RegistryInner>);

impl WeakRegistry {
    /// Removes a finished task. No-op if already drained or the registry is gone.
    pub(crate) fn forget(&self, id: u64) {
        if let Some(inner) = self.0.upgrade() {
            inner.lock().handles.remove(&id);
        }
    }
}

/// Joins every task left in `set`.
async fn join_all(set: &mut JoinSet<()>) {
    while set.join_next().await.is_some() {}
}

impl TaskRegistry {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                tracked: Mutex::new(Tracked::default()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Number of tracked tasks.
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().handles.len()
    }

    /// Spawns `task` and returns once it has been polled for the first time.
    pub(crate) async fn spawn<K: Task>(&self, task: K, bus: &Bus) -> TaskHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let name: Arc<str> = Arc::from(task.name());
        let handle = TaskHandle {
            inner: Arc::new(TaskShared::new(id, name, CancellationToken::new())),
        };
        let (started, handshake) = completion::pair::<()>();

        let wrapper = runner::supervise(
            Box::new(task),
            handle.clone(),
            started,
            WeakRegistry(Arc::downgrade(&self.inner)),
            bus.clone(),
        );

        bus.publish(Event::new(EventKind::TaskScheduled).with_task(handle.name()));
        {
            let mut tracked = self.inner.lock();
            while tracked.set.try_join_next().is_some() {}
            tracked.set.spawn(wrapper);
            tracked.handles.insert(id, handle.clone());
        }

        // Abandoned only if the wrapper was dropped before its first poll.
        let _ = handshake.await;
        handle
    }

    /// Cancels every tracked task and waits for them, aborting stragglers after `grace`.
    ///
    /// `None` means no grace: unfinished tasks are aborted right away. Aborted tasks
    /// get at most [`ABORT_WAIT`] to unwind before this returns.
    pub(crate) async fn cancel_all(&self, grace: Option<Duration>) -> Result<(), RuntimeError> {
        let (handles, mut set) = {
            let mut tracked = self.inner.lock();
            let handles: Vec<TaskHandle> = tracked.handles.drain().map(|(_, h)| h).collect();
            (handles, std::mem::take(&mut tracked.set))
        };
        if set.is_empty() {
            return Ok(());
        }

        for h in &handles {
            h.cancel();
        }

        let joined = match grace {
            Some(g) => time::timeout(g, join_all(&mut set)).await.is_ok(),
            None => false,
        };
        if joined {
            return Ok(());
        }

        let mut stuck: Vec<String> = handles
            .iter()
            .filter(|h| !h.is_finished())
            .map(|h| h.name().to_string())
            .collect();
        stuck.sort_unstable();

        set.abort_all();
        if time::timeout(ABORT_WAIT, join_all(&mut set)).await.is_err() {
            tracing::warn!(left = set.len(), "aborted tasks still running; detaching");
            set.detach_all();
        }

        if stuck.is_empty() {
            Ok(())
        } else {
            Err(RuntimeError::GraceExceeded {
                grace: grace.unwrap_or(Duration::ZERO),
                stuck,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::tasks::TaskFn;

    #[tokio::test]
    async fn test_finished_tasks_forget_themselves() {
        let registry = TaskRegistry::new();
        let bus = Bus::new(16);

        let handle = registry
            .spawn(
                TaskFn::new("quick", |_ctx: CancellationToken| async {
                    Ok::<(), TaskError>(())
                }),
                &bus,
            )
            .await;

        assert_eq!(handle.wait().await, Ok(()));
        assert_eq!(registry.len(), 0);
        assert!(registry.cancel_all(Some(Duration::from_secs(1))).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancel_all_interrupts_pending_tasks() {
        let registry = TaskRegistry::new();
        let bus = Bus::new(16);

        let handle = registry
            .spawn(
                TaskFn::new("sleeper", |_ctx: CancellationToken| async {
                    std::future::pending::<()>().await;
                    Ok::<(), TaskError>(())
                }),
                &bus,
            )
            .await;
        assert_eq!(registry.len(), 1);

        assert!(registry.cancel_all(Some(Duration::from_secs(1))).await.is_ok());
        assert!(handle.is_finished());
        assert_eq!(handle.outcome(), Some(Err(TaskError::Canceled)));
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test]
    async fn test_zero_grace_aborts_and_reports() {
        let registry = TaskRegistry::new();
        let bus = Bus::new(16);

        let handle = registry
            .spawn(
                TaskFn::new("stubborn", |_ctx: CancellationToken| async {
                    std::future::pending::<()>().await;
                    Ok::<(), TaskError>(())
                }),
                &bus,
            )
            .await;

        let err = registry.cancel_all(None).await.err();
        match err {
            Some(RuntimeError::GraceExceeded { stuck, grace }) => {
                assert_eq!(stuck, vec!["stubborn".to_string()]);
                assert_eq!(grace, Duration::ZERO);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(handle.is_finished());
    }
}

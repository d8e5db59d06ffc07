//! # Completion handles: single-assignment signals.
//!
//! A completion is split in two halves created by [`pair`]:
//! - [`Resolver`] is cloneable and may be handed to any number of parties;
//!   the first [`Resolver::resolve`] wins, later calls are no-ops.
//! - [`Completion`] is the single waiter. It is a future that yields the value,
//!   or [`Abandoned`] once every resolver is dropped without resolving.
//!
//! ```text
//! resolver.resolve(v) ──► [pending → resolved] ──► completion.await == Ok(v)
//! drop(all resolvers) ──► [pending → abandoned] ─► completion.await == Err(Abandoned)
//! ```
//!
//! Resolution and cleanup may race (a push resolving a handle its waiter is
//! concurrently withdrawing), so double resolution is tolerated.
//!
//! ## Example
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (resolver, completion) = streamvisor::completion::pair::<u32>();
//!
//! assert!(resolver.resolve(7));
//! assert!(!resolver.resolve(8));
//! assert_eq!(completion.await, Ok(7));
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::Abandoned;

/// Creates a pending completion and its resolver.
pub fn pair<T>() -> (Resolver<T>, Completion<T>) {
    let (tx, rx) = oneshot::channel();
    (
        Resolver {
            slot: Arc::new(Mutex::new(Some(tx))),
        },
        Completion { rx },
    )
}

/// Resolving half of a completion handle.
#[derive(Debug)]
pub struct Resolver<T> {
    slot: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Resolver<T> {
    /// Resolves the completion with `value` if it is still pending.
    ///
    /// Returns `true` if the value reached a live waiter. Returns `false` if the
    /// handle was already resolved or the waiter is gone; `value` is dropped then.
    pub fn resolve(&self, value: T) -> bool {
        let tx = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match tx {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }

    /// True once [`resolve`](Self::resolve) has been called on any clone.
    pub fn is_resolved(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Waiting half of a completion handle.
///
/// Dropping it withdraws the waiter; a later `resolve` then returns `false`.
#[derive(Debug)]
#[must_use = "a completion does nothing unless awaited"]
pub struct Completion<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Future for Completion<T> {
    type Output = Result<T, Abandoned>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map_err(|_| Abandoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_wakes_waiter() {
        let (resolver, completion) = pair::<&'static str>();
        let waiter = tokio::spawn(completion);
        tokio::task::yield_now().await;

        assert!(resolver.resolve("ready"));
        assert_eq!(waiter.await.ok(), Some(Ok("ready")));
    }

    #[tokio::test]
    async fn test_double_resolution_is_noop() {
        let (resolver, completion) = pair::<u8>();
        let other = resolver.clone();

        assert!(resolver.resolve(1));
        assert!(other.is_resolved());
        assert!(!other.resolve(2));
        assert_eq!(completion.await, Ok(1));
    }

    #[tokio::test]
    async fn test_dropped_resolvers_abandon_waiter() {
        let (resolver, completion) = pair::<u8>();
        let clone = resolver.clone();
        drop(resolver);
        drop(clone);

        assert_eq!(completion.await, Err(Abandoned));
    }

    #[test]
    fn test_resolve_after_waiter_dropped_reports_false() {
        let (resolver, completion) = pair::<u8>();
        drop(completion);

        assert!(!resolver.resolve(3));
        assert!(resolver.is_resolved());
    }
}

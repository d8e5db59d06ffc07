//! # Shared coordination state of one streamer.
//!
//! Holds the two pending registries and the subscriber set behind one mutex:
//!
//! ```text
//! delivery registry:  reg id   → { subscription, Resolver<T> }   (subscriptions waiting for an item)
//! readiness registry: round id → { pending ids, Resolver<()> }   (pushes waiting for consumers)
//! subscriber set:     { subscription id }                      (every open subscription)
//! ```
//!
//! ## Rules
//! - The mutex is never held across an `.await`.
//! - An entry exists only while its waiter is suspended on it; waiters withdraw
//!   their own entries through drop guards.
//! - Fan-out iterates a snapshot of the delivery registry.
//! - A round resolves once every subscription it delivered to has come back
//!   for the next item or has left.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::completion::{self, Completion, Resolver};
use crate::core::config::StreamerConfig;
use crate::core::registry::TaskRegistry;
use crate::events::Bus;

/// A subscription waiting for its next item.
struct Delivery<T> {
    subscription: u64,
    resolver: Resolver<T>,
}

/// A push waiting until its recipients are ready again.
struct Round {
    pending: HashSet<u64>,
    resolver: Resolver<()>,
}

/// Registry sizes at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamerStats {
    /// Open subscriptions.
    pub subscribers: usize,
    /// Subscriptions currently suspended waiting for an item.
    pub waiting: usize,
    /// Pushes currently suspended waiting for their recipients.
    pub rounds: usize,
    /// Managed tasks still tracked for cancellation.
    pub tasks: usize,
}

pub(crate) struct State<T> {
    closed: bool,
    next_id: u64,
    subscribers: HashSet<u64>,
    delivery: HashMap<u64, Delivery<T>>,
    readiness: HashMap<u64, Round>,
}

impl<T> State<T> {
    fn new() -> Self {
        Self {
            closed: false,
            next_id: 1,
            subscribers: HashSet::new(),
            delivery: HashMap::new(),
            readiness: HashMap::new(),
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn is_subscribed(&self, subscription: u64) -> bool {
        self.subscribers.contains(&subscription)
    }

    /// Allocates a subscription id and adds it to the set unless closed.
    ///
    /// The flag is `false` for an orphaned subscription created after `close()`.
    pub(crate) fn join(&mut self) -> (u64, bool) {
        let id = self.next_id();
        if self.closed {
            return (id, false);
        }
        self.subscribers.insert(id);
        (id, true)
    }

    /// Removes a subscription and releases every round still waiting on it.
    ///
    /// Returns `false` if it was not in the set.
    pub(crate) fn leave(&mut self, subscription: u64) -> bool {
        if !self.subscribers.remove(&subscription) {
            return false;
        }
        self.delivery.retain(|_, d| d.subscription != subscription);
        self.signal_ready(subscription);
        true
    }

    /// Marks `subscription` ready in every pending round, resolving rounds that become empty.
    pub(crate) fn signal_ready(&mut self, subscription: u64) {
        for round in self.readiness.values_mut() {
            if round.pending.remove(&subscription) && round.pending.is_empty() {
                round.resolver.resolve(());
            }
        }
    }

    pub(crate) fn register_delivery(&mut self, subscription: u64) -> (u64, Completion<T>) {
        let id = self.next_id();
        let (resolver, completion) = completion::pair();
        self.delivery.insert(
            id,
            Delivery {
                subscription,
                resolver,
            },
        );
        (id, completion)
    }

    pub(crate) fn withdraw_delivery(&mut self, id: u64) {
        self.delivery.remove(&id);
    }

    pub(crate) fn has_subscribers(&self) -> bool {
        !self.subscribers.is_empty()
    }

    pub(crate) fn open_round(&mut self, pending: HashSet<u64>) -> (u64, Completion<()>) {
        let id = self.next_id();
        let (resolver, completion) = completion::pair();
        self.readiness.insert(id, Round { pending, resolver });
        (id, completion)
    }

    pub(crate) fn close_round(&mut self, id: u64) {
        self.readiness.remove(&id);
    }

    /// Marks the state closed and drops every registration.
    ///
    /// Waiters observe abandonment. Returns the ids of the subscriptions that were open.
    pub(crate) fn shutdown(&mut self) -> Vec<u64> {
        self.closed = true;
        self.delivery.clear();
        self.readiness.clear();
        let mut ids: Vec<u64> = self.subscribers.drain().collect();
        ids.sort_unstable();
        ids
    }

    pub(crate) fn stats(&self) -> StreamerStats {
        StreamerStats {
            subscribers: self.subscribers.len(),
            waiting: self.delivery.len(),
            rounds: self.readiness.len(),
            tasks: 0,
        }
    }
}

impl<T: Clone> State<T> {
    /// Resolves every waiting delivery with a clone of `item`.
    ///
    /// Returns the subscriptions that actually received it.
    pub(crate) fn broadcast(&mut self, item: &T) -> HashSet<u64> {
        let snapshot: Vec<(u64, Resolver<T>)> = self
            .delivery
            .values()
            .map(|d| (d.subscription, d.resolver.clone()))
            .collect();

        snapshot
            .into_iter()
            .filter(|(_, resolver)| resolver.resolve(item.clone()))
            .map(|(subscription, _)| subscription)
            .collect()
    }
}

/// Everything a streamer and its subscriptions share.
pub(crate) struct Shared<T> {
    state: Mutex<State<T>>,
    /// Event bus.
    pub(crate) bus: Bus,
    /// Cancelled by `close()`; interrupts every suspended subscription.
    pub(crate) streams: CancellationToken,
    /// Managed tasks.
    pub(crate) tasks: TaskRegistry,
    pub(crate) cfg: StreamerConfig,
}

impl<T> Shared<T> {
    pub(crate) fn new(cfg: StreamerConfig, bus: Bus) -> Self {
        Self {
            state: Mutex::new(State::new()),
            bus,
            streams: CancellationToken::new(),
            tasks: TaskRegistry::new(),
            cfg,
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_resolves_when_all_recipients_ready() {
        let mut state = State::<u8>::new();
        let (a, _) = state.join();
        let (b, _) = state.join();
        let (_, wait_a) = state.register_delivery(a);
        let (_, wait_b) = state.register_delivery(b);

        let recipients = state.broadcast(&7);
        assert_eq!(recipients.len(), 2);
        assert_eq!(wait_a.await, Ok(7));
        assert_eq!(wait_b.await, Ok(7));

        let (round, ready) = state.open_round(recipients);
        state.signal_ready(a);
        assert_eq!(state.stats().rounds, 1);
        state.signal_ready(b);
        assert_eq!(ready.await, Ok(()));

        state.close_round(round);
        assert_eq!(state.stats().rounds, 0);
    }

    #[tokio::test]
    async fn test_leave_releases_round_and_withdraws_delivery() {
        let mut state = State::<u8>::new();
        let (a, _) = state.join();
        let (_, wait) = state.register_delivery(a);
        let recipients = state.broadcast(&1);
        let (_, ready) = state.open_round(recipients);
        assert_eq!(wait.await, Ok(1));

        let (_, _next) = state.register_delivery(a);
        assert!(state.leave(a));
        assert!(!state.leave(a));
        assert_eq!(state.stats().waiting, 0);
        assert_eq!(ready.await, Ok(()));
    }

    #[test]
    fn test_broadcast_skips_withdrawn_waiters() {
        let mut state = State::<u8>::new();
        let (a, _) = state.join();
        let (_, wait) = state.register_delivery(a);
        drop(wait);

        assert!(state.broadcast(&3).is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_abandons_waiters() {
        let mut state = State::<u8>::new();
        let (a, _) = state.join();
        let (_, wait) = state.register_delivery(a);

        assert_eq!(state.shutdown(), vec![a]);
        assert!(state.is_closed());
        assert!(wait.await.is_err());

        let (_, joined) = state.join();
        assert!(!joined);
        assert_eq!(state.stats(), StreamerStats::default());
    }
}

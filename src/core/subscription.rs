//! # Subscription: one single-pass view of a hot stream.
//!
//! Each call to [`Subscription::recv`] runs one cycle:
//!
//! ```text
//! recv()
//!   ├─► signal ready        (releases pushes waiting on this subscription)
//!   ├─► register delivery   (Registration guard)
//!   ├─► await delivery ─────┬─ item      ─► Some(item)
//!   │                       ├─ abandoned ─► None (closed)
//!   │                       └─ streams token cancelled ─► None (closed)
//!   └─► guard drop: withdraw delivery (also when the recv future is dropped)
//! ```
//!
//! ## Rules
//! - Items pushed while the subscription is not inside `recv` are missed.
//! - Once `recv` returns `None` the subscription is closed for good.
//! - Dropping the subscription leaves the subscriber set and releases any push
//!   still waiting on it.

use std::fmt;
use std::sync::Arc;

use futures::Stream;

use crate::core::state::Shared;
use crate::events::{Event, EventKind};

/// Removes a delivery registration on every exit path.
struct Registration<'a, T> {
    shared: &'a Shared<T>,
    id: u64,
}

impl<T> Drop for Registration<'_, T> {
    fn drop(&mut self) {
        self.shared.lock().withdraw_delivery(self.id);
    }
}

/// A subscriber sequence created by [`Streamer::subscribe`](crate::Streamer::subscribe).
pub struct Subscription<T> {
    id: u64,
    shared: Arc<Shared<T>>,
    closed: bool,
}

impl<T> Subscription<T> {
    pub(crate) fn new(id: u64, shared: Arc<Shared<T>>, closed: bool) -> Self {
        Self { id, shared, closed }
    }

    /// Identifier of this subscription, unique per streamer.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// True once the subscription ended (closed explicitly, or its streamer closed).
    pub fn is_closed(&self) -> bool {
        self.closed || self.shared.streams.is_cancelled()
    }

    /// Closes the subscription: leaves the subscriber set, later `recv` calls return `None`.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if self.shared.lock().leave(self.id) {
            tracing::debug!(subscription = self.id, "subscription closed");
            self.shared
                .bus
                .publish(Event::new(EventKind::SubscriptionClosed).with_subscription(self.id));
        }
    }

    /// Waits for the next pushed item.
    ///
    /// Returns `None` once the subscription or its streamer is closed.
    /// Cancel safe: dropping the future withdraws the registration, though an item
    /// delivered to it in the meantime is lost.
    pub async fn recv(&mut self) -> Option<T> {
        if self.closed {
            return None;
        }

        let registered = {
            let mut state = self.shared.lock();
            if state.is_closed() || !state.is_subscribed(self.id) {
                None
            } else {
                state.signal_ready(self.id);
                Some(state.register_delivery(self.id))
            }
        };
        let Some((reg_id, delivery)) = registered else {
            self.close();
            return None;
        };

        let registration = Registration {
            shared: &self.shared,
            id: reg_id,
        };
        let item = tokio::select! {
            biased;
            _ = self.shared.streams.cancelled() => None,
            res = delivery => res.ok(),
        };
        drop(registration);

        if item.is_none() {
            self.close();
        }
        item
    }

    /// Adapts the subscription into a [`Stream`] that ends when it is closed.
    pub fn into_stream(self) -> impl Stream<Item = T> + Send + 'static
    where
        T: Send + 'static,
    {
        futures::stream::unfold(self, |mut sub| async move {
            let item = sub.recv().await?;
            Some((item, sub))
        })
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

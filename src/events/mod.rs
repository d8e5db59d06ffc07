//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Streamer` (push, close), `Subscription` (open/close),
//!   the managed task wrapper (scheduled/terminal outcomes).
//! - **Consumers**: the observer listener spawned by `StreamerBuilder::build`,
//!   which fans events out to the `ObserverSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

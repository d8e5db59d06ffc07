//! # streamvisor
//!
//! **Streamvisor** is a hot, multi-subscriber broadcast stream with per-push
//! backpressure, plus a small supervisor for the consumer tasks that read it.
//!
//! A producer pushes items one at a time. Every subscription waiting at push time
//! receives that exact item, and the push does not complete until each of them has
//! processed it and come back for the next one. Subscriptions that were not waiting
//! never see the item: no buffering, no replay.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!          producer
//!             │ push(item)
//!             ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Streamer                                                         │
//! │  - delivery registry   (subscriptions waiting for an item)        │
//! │  - readiness registry  (pushes waiting for their recipients)      │
//! │  - subscriber set      (every open Subscription)                  │
//! │  - TaskRegistry        (managed consumer tasks)                   │
//! │  - Bus                 (runtime events → ObserverSet)             │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!  │ Subscription │   │ Subscription │   │ Subscription │
//!  │  (task #1)   │   │  (task #2)   │   │  (task #3)   │
//!  └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! ### One push
//! ```text
//! push(x)
//!   ├─► resolve every waiting delivery with x      (fan-out, not load-balancing)
//!   ├─► zero recipients? ─► return
//!   ├─► open readiness round { recipients }
//!   ├─► wait: each recipient calls recv() again, or leaves
//!   └─► remove round, return
//!
//! recv()
//!   ├─► signal ready (releases rounds waiting on this subscription)
//!   ├─► register delivery
//!   ├─► wait for item / close
//!   └─► withdraw delivery (always)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                      |
//! |-------------------|--------------------------------------------------------------|-----------------------------------------|
//! | **Streaming**     | Hot broadcast with backpressure barrier per push.            | [`Streamer`], [`Subscription`]          |
//! | **Supervision**   | Managed consumer tasks, start handshake, bulk cancellation.  | [`Task`], [`TaskFn`], [`TaskHandle`]    |
//! | **Primitives**    | Single-assignment completion handles.                        | [`completion::pair`], [`Resolver`]      |
//! | **Observability** | Runtime events fanned out to observers.                      | [`Observer`], [`Event`], [`EventKind`]  |
//! | **Errors**        | Typed errors for shutdown and task outcomes.                 | [`RuntimeError`], [`TaskError`]         |
//! | **Configuration** | Shutdown grace and bus sizing.                               | [`StreamerConfig`]                      |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] observer _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use streamvisor::{Streamer, StreamerConfig, TaskError, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = StreamerConfig::default();
//!     cfg.grace = Duration::from_secs(1);
//!
//!     let streamer: Streamer<u64> = Streamer::builder(cfg).build();
//!
//!     let mut sub = streamer.subscribe();
//!     let consumer = streamer
//!         .schedule(TaskFn::new("summer", move |_ctx: CancellationToken| async move {
//!             let mut total = 0;
//!             while let Some(n) = sub.recv().await {
//!                 total += n;
//!             }
//!             let _ = total;
//!             Ok::<(), TaskError>(())
//!         }))
//!         .await;
//!
//!     for n in 1..=3 {
//!         streamer.push(n).await;
//!     }
//!
//!     streamer.close().await?;
//!     assert!(consumer.is_finished());
//!     Ok(())
//! }
//! ```
pub mod completion;

mod core;
mod error;
mod events;
mod observers;
mod tasks;

// ---- Public re-exports ----

pub use completion::{Completion, Resolver};
pub use crate::core::{Streamer, StreamerBuilder, StreamerConfig, StreamerStats, Subscription};
pub use error::{Abandoned, RuntimeError, TaskError};
pub use events::{Event, EventKind};
pub use observers::{Observer, ObserverSet};
pub use tasks::{BoxTaskFuture, Task, TaskFn, TaskHandle, TaskOutcome, TaskRef};

// Optional: expose a simple built-in logger observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogWriter;

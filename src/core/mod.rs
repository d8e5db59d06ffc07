//! Runtime core: coordination and lifecycle.
//!
//! The public API from this module is [`Streamer`], [`Subscription`],
//! [`StreamerBuilder`], [`StreamerConfig`] and [`StreamerStats`].
//!
//! Internal modules:
//! - [`state`]: delivery/readiness registries and the subscriber set;
//! - [`subscription`]: the per-subscriber register-wait-yield-cleanup cycle;
//! - [`streamer`]: push, subscribe, schedule, close;
//! - [`registry`]: managed task set and bulk cancellation;
//! - [`runner`]: the wrapper every managed task runs in (start handshake, outcome).

mod builder;
mod config;
mod registry;
mod runner;
mod state;
mod streamer;
mod subscription;

pub use builder::StreamerBuilder;
pub use config::StreamerConfig;
pub use state::StreamerStats;
pub use streamer::Streamer;
pub use subscription::Subscription;

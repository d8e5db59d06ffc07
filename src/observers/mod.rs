//! # Event observers for the streamvisor runtime.
//!
//! - [`Observer`] trait: user extension point receiving every [`Event`](crate::Event)
//! - [`ObserverSet`]: per-observer queues and workers with panic isolation
//! - [`LogWriter`] (feature `logging`): renders events through `tracing`

mod observer;
mod set;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use observer::Observer;
pub use set::ObserverSet;

//! # Streamer configuration.
//!
//! Provides [`StreamerConfig`] centralized settings for a [`Streamer`](crate::Streamer).
//!
//! ## Sentinel values
//! - `grace = 0s` → `close()` aborts cancelled tasks without waiting
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

/// Configuration for a streamer and its task supervisor.
///
/// ## Field semantics
/// - `grace`: Maximum wait for cancelled tasks to exit during `close()`
/// - `bus_capacity`: Event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct StreamerConfig {
    /// Maximum time `close()` waits for cancelled tasks before aborting them.
    ///
    /// Tasks are interrupted at their next suspension point, so this only matters
    /// for tasks that block the executor between awaits.
    /// If exceeded, stragglers are aborted and `close()` returns
    /// `RuntimeError::GraceExceeded` after at most 100ms more. A task blocking the
    /// thread `close()` itself runs on (single-threaded runtime) cannot be bounded.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Observers that lag behind more than `bus_capacity` events skip older ones.
    pub bus_capacity: usize,
}

impl StreamerConfig {
    /// Returns the grace period as an `Option` (`None` = abort immediately).
    #[inline]
    pub fn grace_period(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for StreamerConfig {
    /// Default configuration:
    ///
    /// - `grace = 5s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(5),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        let mut cfg = StreamerConfig::default();
        assert_eq!(cfg.grace_period(), Some(Duration::from_secs(5)));
        assert_eq!(cfg.bus_capacity_clamped(), 1024);

        cfg.grace = Duration::ZERO;
        cfg.bus_capacity = 0;
        assert_eq!(cfg.grace_period(), None);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}

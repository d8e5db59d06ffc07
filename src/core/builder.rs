use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::core::config::StreamerConfig;
use crate::core::state::Shared;
use crate::core::streamer::Streamer;
use crate::events::Bus;
use crate::observers::{Observer, ObserverSet};

/// Builder for constructing a [`Streamer`] with optional observers.
pub struct StreamerBuilder<T> {
    cfg: StreamerConfig,
    observers: Vec<Arc<dyn Observer>>,
    _item: PhantomData<fn() -> T>,
}

impl<T> StreamerBuilder<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: StreamerConfig) -> Self {
        Self {
            cfg,
            observers: Vec::new(),
            _item: PhantomData,
        }
    }

    /// Sets event observers.
    ///
    /// Observers receive runtime events through dedicated workers with bounded queues.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observer>>) -> Self {
        self.observers = observers;
        self
    }

    /// Builds the streamer.
    ///
    /// With observers attached this spawns the observer workers and must be called
    /// within a tokio runtime; without observers it can be called anywhere.
    pub fn build(self) -> Streamer<T> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        if !self.observers.is_empty() {
            observer_listener(&bus, ObserverSet::new(self.observers));
        }
        Streamer::from_shared(Arc::new(Shared::new(self.cfg, bus)))
    }
}

/// Forwards bus events to the observer set until every bus sender is gone.
fn observer_listener(bus: &Bus, set: ObserverSet) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(&ev),
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "observer listener lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    });
}

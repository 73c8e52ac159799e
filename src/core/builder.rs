//! # Orchestrator construction.
//!
//! [`OrchestratorBuilder`] binds the task list, the [`Config`] and optional
//! event subscribers. When subscribers are given, `build()` spawns a listener
//! that forwards every bus event to a [`SubscriberSet`]; it therefore has to be
//! called from within a tokio runtime.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use super::orchestrator::Orchestrator;
use crate::{
    config::Config,
    error::ConfigError,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
    tasks::TaskRef,
};

/// Builder for an [`Orchestrator`].
pub struct OrchestratorBuilder<T> {
    tasks: Vec<TaskRef<T>>,
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<T> OrchestratorBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a builder for the given tasks and configuration.
    pub fn new(tasks: Vec<TaskRef<T>>, cfg: Config) -> Self {
        Self {
            tasks,
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers (logging, metrics, ...).
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Validates the config, then builds.
    pub fn try_build(self) -> Result<Orchestrator<T>, ConfigError> {
        self.cfg.validate()?;
        Ok(self.build())
    }

    /// Builds the orchestrator; an invalid `max_attempts` is clamped to 1.
    pub fn build(self) -> Orchestrator<T> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener = if self.subscribers.is_empty() {
            None
        } else {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            Some(subscriber_listener(&bus, set))
        };
        Orchestrator::new_internal(self.tasks, self.cfg, bus, listener)
    }
}

/// Forwards bus events to `set` until the returned token is cancelled, then
/// flushes what is still buffered and drains the subscriber queues.
fn subscriber_listener(bus: &Bus, set: SubscriberSet) -> CancellationToken {
    let stop = CancellationToken::new();
    let mut rx = bus.subscribe();
    let stopped = stop.clone();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                _ = stopped.cancelled() => break,
            }
        }
        while let Ok(ev) = rx.try_recv() {
            set.emit(ev);
        }
        set.shutdown().await;
    });
    stop
}

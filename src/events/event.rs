//! # Runtime events emitted by the orchestrator and the retry executor.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Run events**: batch lifecycle (started, finished, cancelled, race decided)
//! - **Attempt events**: per-task execution flow (starting, succeeded, failed, timeout, retry)
//! - **Subscriber events**: delivery problems (overflow, panic)
//!
//! The [`Event`] struct carries optional metadata such as the run id, task index
//! and name, attempt number and failure reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use batchvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_run(3)
//!     .with_index(1)
//!     .with_task("posts")
//!     .with_attempt(2)
//!     .with_reason("503");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("posts"));
//! assert_eq!(ev.index, Some(1));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::core::Status;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run events ===
    /// A run started; every outcome was reset to loading.
    ///
    /// Sets: `run`, `reason` (mode label)
    RunStarted,

    /// A run reached its terminal status on its own.
    ///
    /// Sets: `run`, `status`
    RunFinished,

    /// A run was cancelled by the caller; pending outcomes were marked aborted.
    ///
    /// Sets: `run`, `status`
    RunCancelled,

    /// A race run was decided by its first settlement.
    ///
    /// Sets: `run`, `index`, `task`, `status`
    RaceDecided,

    // === Attempt events ===
    /// A task is starting an attempt.
    ///
    /// Sets: `run`, `index`, `task`, `attempt` (1-based, per run)
    TaskStarting,

    /// An attempt produced a value.
    ///
    /// Sets: `run`, `index`, `task`, `attempt`
    TaskSucceeded,

    /// An attempt failed.
    ///
    /// Sets: `run`, `index`, `task`, `attempt`, `reason`
    TaskFailed,

    /// An attempt exceeded its deadline (always followed by `TaskFailed`).
    ///
    /// Sets: `run`, `index`, `task`, `attempt`, `timeout_ms`
    TimeoutHit,

    /// Another attempt was scheduled after a failure.
    ///
    /// Sets: `run`, `index`, `task`, `attempt` (the failed one), `delay_ms`, `reason`
    RetryScheduled,

    /// A task stopped because the run's cancellation token was tripped.
    ///
    /// Sets: `run`, `index`, `task`, `attempt`
    TaskAborted,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `task` (subscriber name), `reason` (panic message)
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `task` (subscriber name), `reason`
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Run id the event belongs to.
    pub run: Option<u64>,
    /// Position of the task in the configured list.
    pub index: Option<usize>,
    /// Name of the task (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Human-readable reason (errors, overflow details, mode).
    pub reason: Option<Arc<str>>,
    /// Attempt timeout in milliseconds.
    pub timeout_ms: Option<u32>,
    /// Delay before the next attempt in milliseconds.
    pub delay_ms: Option<u32>,
    /// Aggregate status carried by run events.
    pub status: Option<Status>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            run: None,
            index: None,
            task: None,
            attempt: None,
            reason: None,
            timeout_ms: None,
            delay_ms: None,
            status: None,
        }
    }

    /// Attaches a run id.
    #[inline]
    pub fn with_run(mut self, run: u64) -> Self {
        self.run = Some(run);
        self
    }

    /// Attaches a task index.
    #[inline]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(millis(d));
        self
    }

    /// Attaches a retry delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(millis(d));
        self
    }

    /// Attaches an aggregate status.
    #[inline]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }
}

fn millis(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::TaskStarting);
        let b = Event::new(EventKind::TaskStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn durations_saturate_at_u32() {
        let ev = Event::new(EventKind::RetryScheduled)
            .with_delay(Duration::from_secs(u64::MAX / 2))
            .with_timeout(Duration::from_millis(1500));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
        assert_eq!(ev.timeout_ms, Some(1500));
    }
}

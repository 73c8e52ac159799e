//! # Retry executor: bounded attempts for a single task.
//!
//! Wraps one [`Task`] with a bounded-attempt loop. Each attempt is executed by
//! [`run_once`], which races the operation against the optional deadline and
//! the run's cancellation token.
//!
//! ## Flow
//! ```text
//! loop {
//!   ├─► token tripped? ─────────────► Err(Aborted)
//!   ├─► attempt += 1, store.attempt(count), publish TaskStarting
//!   ├─► run_once(task, timeout)
//!   │       ├─ Ok(v)  ─► return Ok(v)            (no further attempts)
//!   │       └─ Err(e) ─► token tripped? ─► publish TaskAborted, Err(Aborted)
//!   │                    attempt == max? ─► return Err(e)   (last error wins)
//!   │                    publish RetryScheduled
//!   │                    backoff? ─► sleep(delay) raced with token
//!   └─► next attempt
//! }
//! ```
//!
//! ## Rules
//! - Cancellation **pre-empts** retry regardless of remaining attempts.
//! - Without a backoff policy the next attempt starts immediately.
//! - `max_attempts = 1` performs exactly one try.
//! - Every attempt start is recorded in the slot, so an in-flight or aborted
//!   task reports how many invocations it made.

use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    core::{
        runner::{Scope, run_once},
        store::SlotStore,
    },
    error::TaskError,
    events::{Bus, EventKind},
    policies::BackoffPolicy,
    tasks::Task,
};

/// Result of driving one task through the retry loop.
#[derive(Debug)]
pub(crate) struct Settled<T> {
    pub result: Result<T, TaskError>,
    /// Invocations made (`0` if the token was tripped before the first one).
    pub attempts: u32,
}

/// Per-run retry parameters plus the bus events are published on.
#[derive(Clone)]
pub(crate) struct RetryExecutor {
    pub max_attempts: u32,
    pub timeout: Option<Duration>,
    pub backoff: Option<BackoffPolicy>,
    pub bus: Bus,
}

impl RetryExecutor {
    pub fn from_config(cfg: &Config, bus: Bus) -> Self {
        Self {
            max_attempts: cfg.attempts_clamped(),
            timeout: cfg.attempt_timeout(),
            backoff: cfg.backoff,
            bus,
        }
    }

    /// Runs `task` until it succeeds, exhausts its attempts, or `token` trips.
    pub async fn execute<T>(
        &self,
        task: &dyn Task<T>,
        store: &SlotStore<T>,
        run: u64,
        index: usize,
        token: &CancellationToken,
    ) -> Settled<T>
    where
        T: Clone + Send + 'static,
    {
        let scope = Scope {
            bus: &self.bus,
            run,
            index,
            task: task.name(),
        };
        let mut attempt: u32 = 0;

        loop {
            if token.is_cancelled() {
                return Settled {
                    result: Err(TaskError::Aborted),
                    attempts: attempt,
                };
            }

            attempt += 1;
            store.attempt(run, index, attempt);
            scope.publish(scope.event(EventKind::TaskStarting).with_attempt(attempt));

            let err = match run_once(task, token, self.timeout, attempt, scope).await {
                Ok(value) => {
                    return Settled {
                        result: Ok(value),
                        attempts: attempt,
                    };
                }
                Err(e) => e,
            };

            if token.is_cancelled() {
                scope.publish(scope.event(EventKind::TaskAborted).with_attempt(attempt));
                return Settled {
                    result: Err(TaskError::Aborted),
                    attempts: attempt,
                };
            }
            if attempt >= self.max_attempts {
                return Settled {
                    result: Err(err),
                    attempts: attempt,
                };
            }

            let delay = self
                .backoff
                .map(|b| b.delay_for(attempt - 1))
                .unwrap_or(Duration::ZERO);
            scope.publish(
                scope
                    .event(EventKind::RetryScheduled)
                    .with_attempt(attempt)
                    .with_delay(delay)
                    .with_reason(err.to_string()),
            );

            if delay > Duration::ZERO {
                select! {
                    _ = time::sleep(delay) => {}
                    _ = token.cancelled() => {}
                }
            }
        }
    }
}

//! # Run a single attempt of a task.
//!
//! Executes one attempt of a [`Task`] raced against an optional deadline and the
//! run's cancellation token, and publishes the attempt's terminal event.
//!
//! ## Event flow
//! ```text
//! Success:       task.spawn() → Ok(v)            → publish TaskSucceeded
//! Failure:       task.spawn() → Err(e)           → publish TaskFailed
//! Timeout:       deadline first → cancel child   → publish TimeoutHit, TaskFailed
//! Cancellation:  token first    → cancel child   → Err(Aborted), no event here
//! ```
//!
//! ## Rules
//! - Derives a **child token** per attempt; cancelling it never affects the run.
//! - The losing branch of the race is dropped, not awaited.

use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::{
    error::TaskError,
    events::{Bus, Event, EventKind},
    tasks::Task,
};

/// Identity of one task within one run, used to stamp events.
#[derive(Clone, Copy)]
pub(crate) struct Scope<'a> {
    pub bus: &'a Bus,
    pub run: u64,
    pub index: usize,
    pub task: &'a str,
}

impl Scope<'_> {
    /// Creates an event of `kind` stamped with run, index and task name.
    pub fn event(&self, kind: EventKind) -> Event {
        Event::new(kind)
            .with_run(self.run)
            .with_index(self.index)
            .with_task(self.task)
    }

    pub fn publish(&self, ev: Event) {
        self.bus.publish(ev);
    }
}

/// Executes attempt number `attempt` of `task`.
///
/// ### Race
/// - `timeout = Some(d)`: operation vs. deadline timer vs. cancellation
/// - `timeout = None`: operation vs. cancellation
///
/// Whichever settles first decides the attempt; a timed-out or cancelled
/// operation's child token is cancelled so cooperative tasks can stop early.
pub(crate) async fn run_once<T: Send + 'static>(
    task: &dyn Task<T>,
    parent: &CancellationToken,
    timeout: Option<Duration>,
    attempt: u32,
    scope: Scope<'_>,
) -> Result<T, TaskError> {
    let child = parent.child_token();
    let operation = task.spawn(child.clone());

    let res = match timeout {
        Some(dur) => {
            tokio::select! {
                res = operation => res,
                _ = time::sleep(dur) => {
                    child.cancel();
                    scope.publish(
                        scope
                            .event(EventKind::TimeoutHit)
                            .with_attempt(attempt)
                            .with_timeout(dur),
                    );
                    Err(TaskError::Timeout { timeout: dur })
                }
                _ = parent.cancelled() => Err(TaskError::Aborted),
            }
        }
        None => {
            tokio::select! {
                res = operation => res,
                _ = parent.cancelled() => Err(TaskError::Aborted),
            }
        }
    };

    match &res {
        Ok(_) => scope.publish(scope.event(EventKind::TaskSucceeded).with_attempt(attempt)),
        Err(TaskError::Aborted) if parent.is_cancelled() => {}
        Err(e) => scope.publish(
            scope
                .event(EventKind::TaskFailed)
                .with_attempt(attempt)
                .with_reason(e.to_string()),
        ),
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{TaskFn, TaskRef};
    use std::sync::{Arc, Mutex};

    fn scope(bus: &Bus) -> Scope<'_> {
        Scope {
            bus,
            run: 1,
            index: 0,
            task: "probe",
        }
    }

    fn sleeper(ms: u64) -> TaskRef<u64> {
        TaskFn::arc("sleeper", move |_ctx: CancellationToken| async move {
            time::sleep(Duration::from_millis(ms)).await;
            Ok::<_, TaskError>(ms)
        })
    }

    #[tokio::test(start_paused = true)]
    async fn finishes_before_deadline() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let token = CancellationToken::new();

        let res = run_once(
            sleeper(10).as_ref(),
            &token,
            Some(Duration::from_millis(50)),
            1,
            scope(&bus),
        )
        .await;

        assert_eq!(res, Ok(10));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TaskSucceeded);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_wins_and_cancels_child() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let token = CancellationToken::new();
        let seen: Arc<Mutex<Option<CancellationToken>>> = Arc::default();

        let task: TaskRef<()> = {
            let seen = seen.clone();
            TaskFn::arc("stuck", move |ctx: CancellationToken| {
                *seen.lock().unwrap() = Some(ctx.clone());
                async move {
                    ctx.cancelled().await;
                    Ok::<_, TaskError>(())
                }
            })
        };

        let res = run_once(
            task.as_ref(),
            &token,
            Some(Duration::from_millis(30)),
            2,
            scope(&bus),
        )
        .await;

        assert_eq!(
            res,
            Err(TaskError::Timeout {
                timeout: Duration::from_millis(30)
            })
        );
        assert!(!token.is_cancelled());
        let child = seen.lock().unwrap().clone().expect("spawned");
        assert!(child.is_cancelled());

        let hit = rx.recv().await.unwrap();
        assert_eq!(hit.kind, EventKind::TimeoutHit);
        assert_eq!(hit.timeout_ms, Some(30));
        assert_eq!(hit.attempt, Some(2));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TaskFailed);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_waiting() {
        let bus = Bus::new(16);
        let token = CancellationToken::new();
        let trip = token.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(5)).await;
            trip.cancel();
        });

        let res = run_once(sleeper(1_000).as_ref(), &token, None, 1, scope(&bus)).await;
        assert_eq!(res, Err(TaskError::Aborted));
    }
}

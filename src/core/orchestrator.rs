//! # Orchestrator: the batch façade and its status state machine.
//!
//! The [`Orchestrator`] owns the task list, the [`Config`], the [`SlotStore`]
//! and the cancellation token of the current run.
//!
//! ## Lifecycle
//! ```text
//! run():
//!   ├─► run id += 1, fresh CancellationToken
//!   ├─► store.reset(run)          (every slot pending, progress 0, Loading)
//!   ├─► publish RunStarted
//!   └─► spawn driver:
//!         verdict = mode.drive(ctx)        (settlements → store)
//!         status  = token tripped ? Aborted : verdict
//!         store.finish(run, status) ─► publish RunFinished
//!
//! cancel():                              (no-op unless Loading)
//!   ├─► token.cancel()                   (retry loops stop, waits end)
//!   └─► store.abort(run) ─► publish RunCancelled
//! ```
//!
//! ## Rules
//! - `run()` while a run is loading **restarts** the batch. The previous
//!   driver is left to finish on its own; every write it makes carries a stale
//!   run id and is rejected by the store.
//! - A token belongs to exactly one run and is never reused.
//! - Task failures never surface as errors here; they are recorded in outcomes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::{
    builder::OrchestratorBuilder,
    outcome::{Outcome, Status},
    retry::RetryExecutor,
    store::{SlotStore, Snapshot},
};
use crate::{
    config::Config,
    events::{Bus, Event, EventKind},
    strategy::RunContext,
    tasks::TaskRef,
};

struct ActiveRun {
    id: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct RunState {
    last_id: u64,
    active: Option<ActiveRun>,
}

/// Runs a fixed list of tasks under one [`Mode`](crate::Mode) with retry,
/// timeout and cooperative cancellation.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use batchvisor::{Config, Mode, Orchestrator, Status, TaskError, TaskFn, TaskRef};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let users: TaskRef<u32> = TaskFn::arc("users", |_ctx: CancellationToken| async {
///     Ok::<_, TaskError>(10u32)
/// });
/// let posts: TaskRef<u32> = TaskFn::arc("posts", |_ctx: CancellationToken| async {
///     Ok::<_, TaskError>(100u32)
/// });
///
/// let orch = Orchestrator::new(vec![users, posts], Config::new(Mode::Parallel).with_max_attempts(2));
/// orch.run();
/// assert_eq!(orch.wait().await, Status::Success);
/// assert_eq!(orch.outcomes()[1].data, Some(100));
/// assert_eq!(orch.progress(), 1.0);
/// # }
/// ```
pub struct Orchestrator<T> {
    tasks: Arc<[TaskRef<T>]>,
    cfg: Config,
    bus: Bus,
    store: Arc<SlotStore<T>>,
    state: Mutex<RunState>,
    listener: Option<CancellationToken>,
}

impl<T> Orchestrator<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Returns a builder for the given tasks and configuration.
    pub fn builder(tasks: Vec<TaskRef<T>>, cfg: Config) -> OrchestratorBuilder<T> {
        OrchestratorBuilder::new(tasks, cfg)
    }

    /// Creates an orchestrator without subscribers.
    pub fn new(tasks: Vec<TaskRef<T>>, cfg: Config) -> Self {
        Self::builder(tasks, cfg).build()
    }

    pub(crate) fn new_internal(
        tasks: Vec<TaskRef<T>>,
        cfg: Config,
        bus: Bus,
        listener: Option<CancellationToken>,
    ) -> Self {
        let store = Arc::new(SlotStore::new(tasks.len()));
        Self {
            tasks: tasks.into(),
            cfg,
            bus,
            store,
            state: Mutex::new(RunState::default()),
            listener,
        }
    }

    /// Starts (or restarts) a batch and returns immediately.
    ///
    /// Must be called from within a tokio runtime: the batch is driven by a
    /// spawned task. Progress is observed through [`snapshot`](Self::snapshot),
    /// [`subscribe`](Self::subscribe) or [`wait`](Self::wait).
    pub fn run(&self) {
        let mut state = self.lock_state();
        state.last_id += 1;
        let id = state.last_id;
        let token = CancellationToken::new();

        self.store.reset(id);
        self.bus.publish(
            Event::new(EventKind::RunStarted)
                .with_run(id)
                .with_reason(self.cfg.mode.as_label()),
        );

        let ctx = RunContext {
            run: id,
            tasks: Arc::clone(&self.tasks),
            store: Arc::clone(&self.store),
            executor: RetryExecutor::from_config(&self.cfg, self.bus.clone()),
            token: token.clone(),
        };
        let mode = self.cfg.mode;
        let bus = self.bus.clone();

        tokio::spawn(async move {
            let verdict = mode.drive(&ctx).await;
            let status = if ctx.token.is_cancelled() {
                Status::Aborted
            } else {
                Status::from(verdict)
            };
            if ctx.store.finish(ctx.run, status) {
                bus.publish(
                    Event::new(EventKind::RunFinished)
                        .with_run(ctx.run)
                        .with_status(status),
                );
            }
        });

        state.active = Some(ActiveRun { id, token });
    }

    /// Cancels the current batch: trips its token, marks every still-loading
    /// outcome aborted and moves the status to `Aborted`.
    ///
    /// A no-op unless the status is `Loading`.
    pub fn cancel(&self) {
        let state = self.lock_state();
        let Some(active) = state.active.as_ref() else {
            return;
        };
        if self.store.status() != Status::Loading {
            return;
        }

        active.token.cancel();
        if self.store.abort(active.id) {
            self.bus.publish(
                Event::new(EventKind::RunCancelled)
                    .with_run(active.id)
                    .with_status(Status::Aborted),
            );
        }
    }

    /// Convenience: [`run`](Self::run) followed by [`wait`](Self::wait).
    pub async fn run_to_end(&self) -> Status {
        self.run();
        self.wait().await
    }

    /// Waits until the current run leaves `Loading` and returns its status.
    ///
    /// Returns `Idle` immediately if no run was ever started. If the batch is
    /// restarted while waiting, this follows the newest run.
    pub async fn wait(&self) -> Status {
        let mut rx = self.store.subscribe();
        let res = rx.wait_for(|s| s.status != Status::Loading).await;
        match res {
            Ok(snap) => snap.status,
            Err(_) => self.store.status(),
        }
    }

    /// Clones the current snapshot (outcomes, status, progress).
    pub fn snapshot(&self) -> Snapshot<T> {
        self.store.snapshot()
    }

    /// Current outcomes, one per task index.
    pub fn outcomes(&self) -> Vec<Outcome<T>> {
        self.store.snapshot().outcomes
    }

    /// Current aggregate status.
    pub fn status(&self) -> Status {
        self.store.status()
    }

    /// Current progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.store.progress()
    }

    /// Receiver notified on every state change, for re-rendering.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.store.subscribe()
    }

    /// The bound configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Number of tasks in the batch.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when the batch has no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn lock_state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Drop for Orchestrator<T> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = state.active.take() {
            active.token.cancel();
        }
        if let Some(listener) = self.listener.take() {
            listener.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Mode, Subscribe,
        error::TaskError,
        tasks::TaskFn,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    fn ok_after(name: &'static str, ms: u64, value: u32) -> TaskRef<u32> {
        TaskFn::arc(name, move |_ctx: CancellationToken| async move {
            sleep(Duration::from_millis(ms)).await;
            Ok::<_, TaskError>(value)
        })
    }

    fn always_failing(name: &'static str, ms: u64, calls: Arc<AtomicU32>) -> TaskRef<u32> {
        TaskFn::arc(name, move |_ctx: CancellationToken| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                sleep(Duration::from_millis(ms)).await;
                Err::<u32, _>(TaskError::fail(format!("{name} failed")))
            }
        })
    }

    fn orchestrator(mode: Mode, tasks: Vec<TaskRef<u32>>) -> Orchestrator<u32> {
        Orchestrator::new(tasks, Config::new(mode))
    }

    #[tokio::test]
    async fn starts_idle() {
        let orch = orchestrator(Mode::Parallel, vec![ok_after("a", 1, 1)]);
        assert_eq!(orch.status(), Status::Idle);
        assert_eq!(orch.progress(), 0.0);
        assert_eq!(orch.outcomes(), vec![Outcome::idle()]);
        assert_eq!(orch.wait().await, Status::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn parallel_and_all_settled_keep_success_despite_task_failure() {
        for mode in [Mode::Parallel, Mode::AllSettled] {
            let calls = Arc::new(AtomicU32::new(0));
            let orch = orchestrator(
                mode,
                vec![
                    ok_after("users", 10, 1),
                    always_failing("posts", 5, calls),
                    ok_after("rates", 20, 3),
                ],
            );

            assert_eq!(orch.run_to_end().await, Status::Success, "{mode:?}");
            let out = orch.outcomes();
            assert_eq!(out[0].data, Some(1));
            assert_eq!(out[1].error, Some(TaskError::fail("posts failed")));
            assert_eq!(out[2].data, Some(3));
            assert_eq!(orch.progress(), 1.0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_failure_is_a_batch_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let orch = orchestrator(
            Mode::Sequential,
            vec![
                always_failing("users", 5, calls),
                ok_after("posts", 5, 2),
                ok_after("rates", 5, 3),
            ],
        );

        assert_eq!(orch.run_to_end().await, Status::Error);
        let out = orch.outcomes();
        assert!(out[0].error.is_some());
        assert!(out[1].is_untouched());
        assert!(out[2].is_untouched());
    }

    #[tokio::test(start_paused = true)]
    async fn race_ignores_late_results() {
        let orch = orchestrator(
            Mode::Race,
            vec![ok_after("a", 30, 0), ok_after("b", 10, 1), ok_after("c", 20, 2)],
        );

        assert_eq!(orch.run_to_end().await, Status::Success);
        sleep(Duration::from_millis(100)).await;

        let out = orch.outcomes();
        assert_eq!(out[1].data, Some(1));
        assert!(out[0].aborted && out[2].aborted);
        assert_eq!(out[0].data, None);
        assert_eq!(orch.progress(), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_mid_parallel_run() {
        let orch = orchestrator(
            Mode::Parallel,
            vec![ok_after("fast", 10, 1), ok_after("slow", 1_000, 2)],
        );
        orch.run();
        sleep(Duration::from_millis(50)).await;
        assert_eq!(orch.outcomes()[0].data, Some(1));

        orch.cancel();
        assert_eq!(orch.status(), Status::Aborted);
        let out = orch.outcomes();
        assert!(!out[0].aborted);
        assert!(out[1].aborted && !out[1].loading);

        // The slow task would have settled by now; its slot must not revert.
        sleep(Duration::from_secs(5)).await;
        let out = orch.outcomes();
        assert!(out[1].aborted);
        assert_eq!(out[1].data, None);
        assert_eq!(orch.wait().await, Status::Aborted);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_retrying() {
        let calls = Arc::new(AtomicU32::new(0));
        let orch = Orchestrator::new(
            vec![always_failing("flaky", 10, calls.clone())],
            Config::new(Mode::Sequential).with_max_attempts(100),
        );
        orch.run();
        sleep(Duration::from_millis(35)).await;
        let running = orch.outcomes()[0].clone();
        assert!(running.loading);
        assert_eq!(running.attempts, 4);
        assert!(!running.is_untouched());

        orch.cancel();
        sleep(Duration::from_secs(1)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        let out = orch.outcomes();
        assert!(out[0].aborted);
        assert_eq!(out[0].attempts, 4);
        assert_eq!(orch.status(), Status::Aborted);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_race_before_any_settlement() {
        let orch = orchestrator(
            Mode::Race,
            vec![ok_after("eu", 100, 0), ok_after("us", 50, 1), ok_after("ap", 80, 2)],
        );
        let mut rx = orch.bus.subscribe();
        orch.run();
        sleep(Duration::from_millis(20)).await;

        orch.cancel();
        assert_eq!(orch.status(), Status::Aborted);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(orch.wait().await, Status::Aborted);
        let out = orch.outcomes();
        assert!(out.iter().all(|o| o.aborted && !o.loading && o.data.is_none()));
        assert!(out.iter().all(|o| o.attempts == 1));
        assert_eq!(orch.progress(), 0.0);

        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).map(|ev| ev.kind).collect();
        assert!(kinds.contains(&EventKind::RunCancelled));
        assert!(!kinds.contains(&EventKind::RaceDecided));
        assert!(!kinds.contains(&EventKind::RunFinished));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_when_not_loading_is_a_noop() {
        let orch = orchestrator(Mode::Parallel, vec![ok_after("a", 1, 7)]);
        orch.cancel();
        assert_eq!(orch.status(), Status::Idle);

        assert_eq!(orch.run_to_end().await, Status::Success);
        orch.cancel();
        assert_eq!(orch.status(), Status::Success);
        assert!(!orch.outcomes()[0].aborted);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_discards_previous_run() {
        let calls = Arc::new(AtomicU32::new(0));
        let task: TaskRef<u32> = {
            let calls = calls.clone();
            TaskFn::arc("counter", move |_ctx: CancellationToken| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    sleep(Duration::from_millis(10)).await;
                    Ok::<_, TaskError>(n)
                }
            })
        };
        let orch = orchestrator(Mode::Parallel, vec![task]);
        let mut rx = orch.bus.subscribe();

        orch.run();
        orch.run();
        let snap = orch.snapshot();
        assert_eq!(snap.run, 2);
        assert_eq!(snap.outcomes, vec![Outcome::pending()]);
        assert_eq!(orch.progress(), 0.0);

        assert_eq!(orch.wait().await, Status::Success);
        sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(orch.snapshot().run, 2);

        let finished: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|ev| ev.kind == EventKind::RunFinished)
            .map(|ev| ev.run)
            .collect();
        assert_eq!(finished, vec![Some(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn rerun_after_finish_resets_state() {
        let orch = orchestrator(Mode::Parallel, vec![ok_after("a", 5, 1), ok_after("b", 10, 2)]);
        assert_eq!(orch.run_to_end().await, Status::Success);

        orch.run();
        assert_eq!(orch.status(), Status::Loading);
        assert_eq!(orch.progress(), 0.0);
        assert!(orch.outcomes().iter().all(|o| o.loading));
        assert_eq!(orch.wait().await, Status::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_recorded_per_task() {
        let orch = Orchestrator::new(
            vec![ok_after("weather", 5_000, 1), ok_after("rates", 5, 2)],
            Config::new(Mode::AllSettled).with_timeout(Duration::from_millis(100)),
        );

        assert_eq!(orch.run_to_end().await, Status::Success);
        let out = orch.outcomes();
        assert_eq!(
            out[0].error,
            Some(TaskError::Timeout {
                timeout: Duration::from_millis(100)
            })
        );
        assert_eq!(out[1].data, Some(2));
    }

    #[tokio::test]
    async fn empty_batch_completes() {
        let orch: Orchestrator<u32> = orchestrator(Mode::Race, Vec::new());
        assert!(orch.is_empty());
        assert_eq!(orch.run_to_end().await, Status::Success);
        assert_eq!(orch.progress(), 1.0);
    }

    #[test]
    fn try_build_rejects_zero_attempts() {
        let res = Orchestrator::<u32>::builder(Vec::new(), Config::default().with_max_attempts(0))
            .try_build();
        assert!(res.is_err());
    }

    #[derive(Default)]
    struct Kinds(Mutex<Vec<EventKind>>);

    #[async_trait]
    impl Subscribe for Kinds {
        async fn on_event(&self, event: &Event) {
            self.0.lock().unwrap().push(event.kind);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_the_run_lifecycle() {
        let kinds = Arc::new(Kinds::default());
        let calls = Arc::new(AtomicU32::new(0));
        let orch = Orchestrator::builder(
            vec![always_failing("posts", 5, calls)],
            Config::new(Mode::Parallel).with_max_attempts(2),
        )
        .with_subscriber(kinds.clone())
        .build();

        assert_eq!(orch.run_to_end().await, Status::Success);
        sleep(Duration::from_millis(10)).await;

        assert_eq!(
            *kinds.0.lock().unwrap(),
            vec![
                EventKind::RunStarted,
                EventKind::TaskStarting,
                EventKind::TaskFailed,
                EventKind::RetryScheduled,
                EventKind::TaskStarting,
                EventKind::TaskFailed,
                EventKind::RunFinished,
            ]
        );
    }
}

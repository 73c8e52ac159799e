//! # batchvisor
//!
//! **Batchvisor** runs a fixed list of async tasks as one batch under a chosen
//! coordination mode, with per-task retry, per-attempt timeout and cooperative
//! cancellation, and exposes one observable outcome per task.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   TaskRef    │   │   TaskRef    │   │   TaskRef    │
//!     │  (index 0)   │   │  (index 1)   │   │  (index 2)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Orchestrator (batch façade)                                      │
//! │  - Config (mode, max_attempts, timeout, backoff)                  │
//! │  - run id + CancellationToken of the current run                  │
//! │  - SlotStore (outcomes, status, progress; watch channel)          │
//! │  - Bus (broadcast events)                                         │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!                    ┌───────────────────────┐
//!                    │  Mode::drive (driver) │
//!                    │  parallel/sequential/ │
//!                    │  race/allSettled      │
//!                    └───┬───────┬───────┬───┘
//!                        ▼       ▼       ▼
//!                  ┌──────────────────────────┐
//!                  │ RetryExecutor::execute   │
//!                  │  └─ run_once (timeout,   │
//!                  │     cancellation, child  │
//!                  │     token per attempt)   │
//!                  └────────────┬─────────────┘
//!                               │ settle(run, index, outcome)
//!                               ▼
//!                          SlotStore ──► watch::Receiver<Snapshot> (UI)
//!
//!       events ──► Bus ──► subscriber_listener ──► SubscriberSet ──► Subscribe impls
//! ```
//!
//! ### Run lifecycle
//! ```text
//! Idle ──run()──► Loading ──all settled──► Success | Error
//!                    │
//!                    ├──cancel()──► Aborted
//!                    └──run()───► Loading (new run id; old writes rejected)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                         |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Orchestration** | Run a batch, cancel it, observe outcomes and progress.       | [`Orchestrator`], [`Snapshot`], [`Outcome`]|
//! | **Modes**         | Parallel, sequential, race and all-settled coordination.     | [`Mode`]                                   |
//! | **Policies**      | Optional delay between attempts.                             | [`BackoffPolicy`], [`JitterPolicy`]        |
//! | **Subscriber API**| Hook into run and attempt events (logging, metrics, ...).    | [`Subscribe`], [`Event`]                   |
//! | **Errors**        | Typed task and configuration errors.                         | [`TaskError`], [`ConfigError`]             |
//! | **Tasks**         | Define tasks as closures over a cancellation token.          | [`TaskRef`], [`TaskFn`], [`Task`]          |
//! | **Configuration** | One immutable config per orchestrator.                       | [`Config`]                                 |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use batchvisor::{Config, Mode, Orchestrator, Status, TaskError, TaskFn, TaskRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let cfg = Config::new(Mode::AllSettled)
//!         .with_max_attempts(3)
//!         .with_timeout(Duration::from_secs(5));
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn batchvisor::Subscribe>> = vec![Arc::new(batchvisor::LogWriter::default())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn batchvisor::Subscribe>> = Vec::new();
//!
//!     let users: TaskRef<String> = TaskFn::arc("users", |ctx: CancellationToken| async move {
//!         if ctx.is_cancelled() {
//!             return Err(TaskError::Aborted);
//!         }
//!         Ok("3 users".to_string())
//!     });
//!     let weather: TaskRef<String> = TaskFn::arc("weather", |_ctx: CancellationToken| async move {
//!         Err::<String, _>(TaskError::fail("503 Service Unavailable"))
//!     });
//!
//!     let orch = Orchestrator::builder(vec![users, weather], cfg)
//!         .with_subscribers(subs)
//!         .build();
//!
//!     assert_eq!(orch.run_to_end().await, Status::Success);
//!     let out = orch.outcomes();
//!     assert_eq!(out[0].data.as_deref(), Some("3 users"));
//!     assert_eq!(out[1].attempts, 3);
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod policies;
mod strategy;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{Orchestrator, OrchestratorBuilder, Outcome, Progress, SlotStore, Snapshot, Status};
pub use config::Config;
pub use error::{ConfigError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use strategy::Mode;
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{BoxTaskFuture, Task, TaskFn, TaskRef};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

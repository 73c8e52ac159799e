//! Runtime core: outcome store, retry executor and the orchestrator façade.
//!
//! Internal modules:
//! - [`outcome`]: per-task [`Outcome`] records and the aggregate [`Status`];
//! - [`progress`]: settled-over-total [`Progress`];
//! - [`store`]: run-scoped, serialized [`SlotStore`];
//! - [`runner`]: one attempt raced against timeout and cancellation;
//! - [`retry`]: bounded-attempt loop around the runner;
//! - [`orchestrator`]: `run`/`cancel` and the status state machine;
//! - [`builder`]: orchestrator construction and subscriber wiring.

mod builder;
mod orchestrator;
mod outcome;
mod progress;
mod retry;
mod runner;
mod store;

pub use builder::OrchestratorBuilder;
pub use orchestrator::Orchestrator;
pub use outcome::{Outcome, Status};
pub use progress::Progress;
pub(crate) use retry::RetryExecutor;
pub use store::{SlotStore, Snapshot};

//! # Mode strategies.
//!
//! A [`Mode`] is one of four interchangeable algorithms that drive every task of
//! a run through the retry executor and feed settlements into the
//! [`SlotStore`](crate::SlotStore):
//!
//! | Mode         | Start          | Records                     | Batch verdict              |
//! |--------------|----------------|-----------------------------|----------------------------|
//! | `Parallel`   | all at once    | every settlement            | `Success`                  |
//! | `Sequential` | one at a time  | until the first failure     | `Error` on first failure   |
//! | `Race`       | all at once    | first settlement only       | winner's success/failure   |
//! | `AllSettled` | all at once    | every settlement            | `Success`                  |
//!
//! In every mode a tripped cancellation token overrides the verdict with
//! `Aborted`; that override lives in the orchestrator, not here.

mod fanout;
mod race;
mod sequential;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::{RetryExecutor, SlotStore, Status};
use crate::tasks::TaskRef;

/// Coordination strategy for a batch, fixed for the duration of one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Run every task concurrently; wait for all, never short-circuit.
    #[default]
    Parallel,
    /// Run tasks one at a time in index order; stop at the first failure.
    Sequential,
    /// Run every task concurrently; the first settlement decides the batch.
    Race,
    /// Same mechanics as `Parallel`, selected when every status matters equally.
    AllSettled,
}

impl Mode {
    /// Returns a short stable label (camelCase, as callers usually spell modes).
    pub fn as_label(self) -> &'static str {
        match self {
            Mode::Parallel => "parallel",
            Mode::Sequential => "sequential",
            Mode::Race => "race",
            Mode::AllSettled => "allSettled",
        }
    }

    /// Drives the whole batch described by `ctx`.
    pub(crate) async fn drive<T>(self, ctx: &RunContext<T>) -> Verdict
    where
        T: Clone + Send + Sync + 'static,
    {
        match self {
            Mode::Parallel | Mode::AllSettled => fanout::drive(ctx).await,
            Mode::Sequential => sequential::drive(ctx).await,
            Mode::Race => race::drive(ctx).await,
        }
    }
}

/// Batch-level result reported by a strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    Success,
    Error,
}

impl From<Verdict> for Status {
    fn from(v: Verdict) -> Self {
        match v {
            Verdict::Success => Status::Success,
            Verdict::Error => Status::Error,
        }
    }
}

/// Everything a strategy needs for one run.
pub(crate) struct RunContext<T> {
    pub run: u64,
    pub tasks: Arc<[TaskRef<T>]>,
    pub store: Arc<SlotStore<T>>,
    pub executor: RetryExecutor,
    pub token: CancellationToken,
}

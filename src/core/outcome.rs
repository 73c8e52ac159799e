//! # Per-task outcome records and the aggregate status.
//!
//! An [`Outcome`] is the observable state of one task slot. Outcomes are never
//! patched field by field: every transition builds a complete new record that
//! replaces the previous one in the [`SlotStore`](crate::SlotStore).
//!
//! ## Shapes
//! ```text
//! idle()       loading=false data=None    error=None    aborted=false  (before any run)
//! pending()    loading=true  data=None    error=None    aborted=false  (reset by run)
//! attempting() loading=true  data=None    error=None    aborted=false  attempts=n
//! succeeded()  loading=false data=Some(v) error=None    aborted=false
//! failed()     loading=false data=None    error=Some(e) aborted=false
//! aborted()    loading=false data=None    error=<kept>  aborted=true
//! ```

use crate::error::TaskError;

/// Observable state of a single task within the current run.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome<T> {
    /// The task has not settled yet in the current run.
    pub loading: bool,
    /// Value produced by the task.
    pub data: Option<T>,
    /// Last error, after all attempts were exhausted.
    pub error: Option<TaskError>,
    /// The run was cancelled (or the race lost) before this task settled.
    pub aborted: bool,
    /// Invocations made for this task in the current run (`0` = never attempted).
    pub attempts: u32,
}

impl<T> Outcome<T> {
    /// Placeholder used before the first run.
    pub fn idle() -> Self {
        Self {
            loading: false,
            data: None,
            error: None,
            aborted: false,
            attempts: 0,
        }
    }

    /// Placeholder installed for every task at the start of a run.
    pub fn pending() -> Self {
        Self {
            loading: true,
            ..Self::idle()
        }
    }

    /// Placeholder for a task whose attempt number `attempts` is in flight.
    pub(crate) fn attempting(attempts: u32) -> Self {
        Self {
            attempts,
            ..Self::pending()
        }
    }

    pub(crate) fn succeeded(data: T, attempts: u32) -> Self {
        Self {
            loading: false,
            data: Some(data),
            error: None,
            aborted: false,
            attempts,
        }
    }

    pub(crate) fn failed(error: TaskError, attempts: u32) -> Self {
        Self {
            loading: false,
            data: None,
            error: Some(error),
            aborted: false,
            attempts,
        }
    }

    pub(crate) fn from_result(result: Result<T, TaskError>, attempts: u32) -> Self {
        match result {
            Ok(data) => Self::succeeded(data, attempts),
            Err(error) => Self::failed(error, attempts),
        }
    }

    /// Force-marks the slot as aborted. A stale error survives; data never does.
    pub(crate) fn into_aborted(self) -> Self {
        Self {
            loading: false,
            data: None,
            error: self.error,
            aborted: true,
            attempts: self.attempts,
        }
    }

    /// True once the task produced a value or exhausted its attempts.
    pub fn is_settled(&self) -> bool {
        self.data.is_some() || self.error.is_some()
    }

    /// True for a slot that was reset by a run but never attempted.
    ///
    /// After a sequential chain halts, the tasks behind the failing one stay in
    /// this state.
    pub fn is_untouched(&self) -> bool {
        self.attempts == 0 && !self.is_settled() && !self.aborted
    }
}

impl<T> Default for Outcome<T> {
    fn default() -> Self {
        Self::idle()
    }
}

/// Batch-level state machine.
///
/// ```text
/// Idle ──run()──► Loading ──► Success | Error | Aborted
///                   ▲                    │
///                   └──────run()─────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// No run has started yet.
    #[default]
    Idle,
    /// A run is in progress.
    Loading,
    /// The run completed; see each outcome for per-task failures.
    Success,
    /// The run failed at the batch level (sequential halt, lost race).
    Error,
    /// The run was cancelled.
    Aborted,
}

impl Status {
    /// True for `Success`, `Error` and `Aborted`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Success | Status::Error | Status::Aborted)
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Loading => "loading",
            Status::Success => "success",
            Status::Error => "error",
            Status::Aborted => "aborted",
        }
    }
}

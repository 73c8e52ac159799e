//! # Task abstraction.
//!
//! A [`Task`] is an opaque nullary operation that produces a value of type `T`
//! or fails with a [`TaskError`]. The orchestrator identifies a task by its
//! position in the configured list; the [`name`](Task::name) is only used for
//! events and logs.
//!
//! Tasks are stateless from the orchestrator's point of view: every attempt of
//! every run calls [`Task::spawn`] again and awaits the fresh future.

use std::{future::Future, pin::Pin, sync::Arc};

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Boxed future returned by [`Task::spawn`].
pub type BoxTaskFuture<T> = Pin<Box<dyn Future<Output = Result<T, TaskError>> + Send + 'static>>;

/// Shared handle to a task.
pub type TaskRef<T> = Arc<dyn Task<T>>;

/// # Asynchronous, cancelable, value-producing operation.
///
/// The token passed to [`spawn`](Task::spawn) is a child of the run's
/// cancellation token. Honoring it is optional: the orchestrator stops waiting
/// on a cancelled attempt either way, but a task that checks the token can
/// release its resources early.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use batchvisor::{BoxTaskFuture, Task, TaskError};
///
/// struct Rates;
///
/// impl Task<f64> for Rates {
///     fn name(&self) -> &str { "rates" }
///
///     fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture<f64> {
///         Box::pin(async move {
///             if ctx.is_cancelled() {
///                 return Err(TaskError::Aborted);
///             }
///             Ok(1.08)
///         })
///     }
/// }
/// ```
pub trait Task<T>: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Creates a new future performing one invocation of the operation.
    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture<T>;
}

//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a fresh
//! future per spawn. No state is carried between attempts or runs; if the closure
//! needs shared state, capture an `Arc<...>` explicitly.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use batchvisor::{TaskFn, TaskRef, TaskError};
//!
//! let t: TaskRef<Vec<String>> = TaskFn::arc("users", |_ctx: CancellationToken| async move {
//!     Ok::<_, TaskError>(vec!["Leanne Graham".to_string()])
//! });
//!
//! assert_eq!(t.name(), "users");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::{BoxTaskFuture, Task};

/// Function-backed task implementation.
///
/// Wraps a closure that *creates* a new future per spawn.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<T, F, Fut> Task<T> for TaskFn<F>
where
    T: Send + 'static,
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture<T> {
        Box::pin((self.f)(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskRef;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn each_spawn_creates_a_fresh_future() {
        let calls = Arc::new(AtomicU32::new(0));
        let task: TaskRef<u32> = {
            let calls = calls.clone();
            TaskFn::arc("counter", move |_ctx: CancellationToken| {
                let calls = calls.clone();
                async move { Ok::<_, TaskError>(calls.fetch_add(1, Ordering::SeqCst) + 1) }
            })
        };

        assert_eq!(task.spawn(CancellationToken::new()).await, Ok(1));
        assert_eq!(task.spawn(CancellationToken::new()).await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn closure_sees_the_token() {
        let task: TaskRef<()> = TaskFn::arc("watcher", |ctx: CancellationToken| async move {
            if ctx.is_cancelled() {
                Err(TaskError::Aborted)
            } else {
                Ok(())
            }
        });

        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(task.spawn(token).await, Err(TaskError::Aborted));
    }
}

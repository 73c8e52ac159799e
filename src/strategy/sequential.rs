//! Sequential chain: one task at a time, in index order, fail-fast.
//!
//! Task `i + 1` never starts before task `i` settled. The first failure is
//! recorded and ends the chain; the remaining slots keep their run-start
//! placeholder and are never attempted.

use super::{RunContext, Verdict};
use crate::core::Outcome;

pub(super) async fn drive<T>(ctx: &RunContext<T>) -> Verdict
where
    T: Clone + Send + Sync + 'static,
{
    for (index, task) in ctx.tasks.iter().enumerate() {
        let settled = ctx
            .executor
            .execute(task.as_ref(), &ctx.store, ctx.run, index, &ctx.token)
            .await;
        let failed = settled.result.is_err();

        ctx.store.settle(
            ctx.run,
            index,
            Outcome::from_result(settled.result, settled.attempts),
        );
        if failed {
            return Verdict::Error;
        }
    }
    Verdict::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testing::{context, delayed, failing};
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };
    use tokio::time::{Duration, Instant};

    #[tokio::test(start_paused = true)]
    async fn runs_in_order_one_at_a_time() {
        let ctx = context(
            vec![delayed("users", 10, "u"), delayed("posts", 20, "p"), delayed("rates", 30, "r")],
            1,
        );
        let started = Instant::now();

        assert_eq!(drive(&ctx).await, Verdict::Success);

        // Durations add up: nothing overlapped.
        assert!(started.elapsed() >= Duration::from_millis(60));
        let data: Vec<_> = ctx.store.snapshot().outcomes.into_iter().map(|o| o.data).collect();
        assert_eq!(data, vec![Some("u"), Some("p"), Some("r")]);
    }

    #[tokio::test(start_paused = true)]
    async fn first_failure_halts_the_chain() {
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let ctx = context(
            vec![
                failing("users", 1, first.clone()),
                failing("posts", 1, second.clone()),
                delayed("rates", 1, "r"),
            ],
            3,
        );

        assert_eq!(drive(&ctx).await, Verdict::Error);
        assert_eq!(first.load(Ordering::SeqCst), 3);
        assert_eq!(second.load(Ordering::SeqCst), 0);

        let snap = ctx.store.snapshot();
        assert!(snap.outcomes[0].error.is_some());
        assert!(snap.outcomes[1].is_untouched());
        assert!(snap.outcomes[2].is_untouched());
        assert!((snap.progress.fraction() - 1.0 / 3.0).abs() < f64::EPSILON);
    }
}

//! Race: every task starts at once; the first settlement wins.
//!
//! The winner's outcome is recorded verbatim, every other slot is force-marked
//! aborted and progress jumps to `1.0`. The losing futures are dropped with the
//! driver's pending set, so nothing they produce later is ever recorded.

use futures::stream::{FuturesUnordered, StreamExt};

use super::{RunContext, Verdict};
use crate::core::{Outcome, Status};
use crate::events::{Event, EventKind};

pub(super) async fn drive<T>(ctx: &RunContext<T>) -> Verdict
where
    T: Clone + Send + Sync + 'static,
{
    let mut pending: FuturesUnordered<_> = ctx
        .tasks
        .iter()
        .enumerate()
        .map(|(index, task)| async move {
            let settled = ctx
                .executor
                .execute(task.as_ref(), &ctx.store, ctx.run, index, &ctx.token)
                .await;
            (index, settled)
        })
        .collect();

    let Some((winner, settled)) = pending.next().await else {
        return Verdict::Success;
    };
    drop(pending);

    let verdict = if settled.result.is_ok() {
        Verdict::Success
    } else {
        Verdict::Error
    };
    let outcome = Outcome::from_result(settled.result, settled.attempts);

    if ctx.store.decide(ctx.run, winner, outcome) {
        ctx.executor.bus.publish(
            Event::new(EventKind::RaceDecided)
                .with_run(ctx.run)
                .with_index(winner)
                .with_task(ctx.tasks[winner].name())
                .with_status(Status::from(verdict)),
        );
    }
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testing::{context, delayed, failing};
    use std::sync::{Arc, atomic::AtomicU32};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn fastest_wins_and_losers_stay_aborted() {
        let ctx = context(
            vec![delayed("slow", 30, "s"), delayed("fast", 10, "f"), delayed("mid", 20, "m")],
            1,
        );

        assert_eq!(drive(&ctx).await, Verdict::Success);
        tokio::time::sleep(Duration::from_millis(100)).await;

        let snap = ctx.store.snapshot();
        assert_eq!(snap.outcomes[1].data, Some("f"));
        for i in [0, 2] {
            assert!(snap.outcomes[i].aborted, "slot {i}");
            assert!(!snap.outcomes[i].loading);
            assert_eq!(snap.outcomes[i].data, None);
        }
        assert_eq!(snap.progress.fraction(), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_winner_decides_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let ctx = context(vec![delayed("slow", 50, "s"), failing("flaky", 5, calls)], 1);

        assert_eq!(drive(&ctx).await, Verdict::Error);
        let snap = ctx.store.snapshot();
        assert!(snap.outcomes[1].error.is_some());
        assert!(snap.outcomes[0].aborted);
    }

    #[tokio::test(start_paused = true)]
    async fn announces_the_winner() {
        let ctx = context(vec![delayed("only", 1, "x")], 1);
        let mut rx = ctx.executor.bus.subscribe();

        drive(&ctx).await;

        let decided = std::iter::from_fn(|| rx.try_recv().ok())
            .find(|ev| ev.kind == EventKind::RaceDecided)
            .expect("race decided event");
        assert_eq!(decided.index, Some(0));
        assert_eq!(decided.status, Some(Status::Success));
    }
}

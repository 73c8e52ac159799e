//! Fan-out/fan-in shared by `Parallel` and `AllSettled`.
//!
//! Every task starts at once; settlements are recorded one by one as they
//! arrive, by this single driver loop, so no two writes ever interleave.

use futures::stream::{FuturesUnordered, StreamExt};

use super::{RunContext, Verdict};
use crate::core::Outcome;

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

    while let Some((index, settled)) = pending.next().await {
        ctx.store.settle(
            ctx.run,
            index,
            Outcome::from_result(settled.result, settled.attempts),
        );
    }

    // Per-task failures live in their outcomes; the batch itself succeeded.
    Verdict::Success
}

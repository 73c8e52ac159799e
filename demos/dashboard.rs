//! # Example: dashboard
//!
//! Loads four simulated data sources in one batch and re-renders a progress
//! line on every state change, the way a UI would.
//!
//! - `users` and `posts` answer quickly;
//! - `weather` fails twice before answering (retried by the executor);
//! - `rates` is slow and runs into the per-attempt timeout.
//!
//! ## Flow
//! ```text
//! run()
//!   ├─► RunStarted{mode=allSettled}
//!   ├─► users   ─► TaskSucceeded
//!   ├─► posts   ─► TaskSucceeded
//!   ├─► weather ─► TaskFailed ─► RetryScheduled ─► ... ─► TaskSucceeded
//!   ├─► rates   ─► TimeoutHit ─► ... (attempts exhausted)
//!   └─► RunFinished{status=success}
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example dashboard --features logging
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use batchvisor::{
    BackoffPolicy, Config, JitterPolicy, LogWriter, Mode, Orchestrator, Status, Subscribe,
    TaskError, TaskFn, TaskRef,
};
use tokio_util::sync::CancellationToken;

static WEATHER_CALLS: AtomicU32 = AtomicU32::new(0);

fn source(name: &'static str, latency: Duration, body: &'static str) -> TaskRef<String> {
    TaskFn::arc(name, move |ctx: CancellationToken| async move {
        tokio::select! {
            _ = tokio::time::sleep(latency) => Ok(body.to_string()),
            _ = ctx.cancelled() => Err(TaskError::Aborted),
        }
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let weather: TaskRef<String> = TaskFn::arc("weather", |_ctx: CancellationToken| async move {
        let n = WEATHER_CALLS.fetch_add(1, Ordering::Relaxed) + 1;
        tokio::time::sleep(Duration::from_millis(80)).await;
        if n <= 2 {
            Err(TaskError::fail(format!("503 Service Unavailable (call #{n})")))
        } else {
            Ok("Berlin 14°C, light rain".to_string())
        }
    });

    let tasks = vec![
        source("users", Duration::from_millis(120), "10 users"),
        source("posts", Duration::from_millis(250), "100 posts"),
        weather,
        source("rates", Duration::from_secs(3), "EUR/USD 1.09"),
    ];

    let cfg = Config::new(Mode::AllSettled)
        .with_max_attempts(3)
        .with_timeout(Duration::from_millis(500))
        .with_backoff(BackoffPolicy::exponential(Duration::from_millis(100)).with_jitter(JitterPolicy::Equal));

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::default())];
    let orch = Orchestrator::builder(tasks, cfg).with_subscribers(subs).build();

    let mut rx = orch.subscribe();
    orch.run();

    loop {
        let status = {
            let snap = rx.borrow_and_update();
            let ready = snap.outcomes.iter().filter(|o| !o.loading).count();
            println!(
                "[dashboard] {:>5.1}% ({ready}/{}) status={}",
                snap.progress.fraction() * 100.0,
                snap.outcomes.len(),
                snap.status.as_label()
            );
            snap.status
        };
        if status != Status::Loading || rx.changed().await.is_err() {
            break;
        }
    }

    let names = ["users", "posts", "weather", "rates"];
    for (name, out) in names.iter().zip(orch.outcomes()) {
        match (&out.data, &out.error) {
            (Some(data), _) => println!("  {name:<8} ok   {data} (attempts={})", out.attempts),
            (None, Some(err)) => println!("  {name:<8} err  {} (attempts={})", err.as_message(), out.attempts),
            (None, None) => println!("  {name:<8} --"),
        }
    }
}

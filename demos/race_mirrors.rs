//! # Example: race_mirrors
//!
//! Asks three mirrors for the same file; the first answer wins and the
//! remaining requests are dropped. A second run is cancelled halfway through.
//!
//! ## Run
//! ```bash
//! cargo run --example race_mirrors
//! ```

use std::time::Duration;

use batchvisor::{Config, Mode, Orchestrator, TaskError, TaskFn, TaskRef};
use tokio_util::sync::CancellationToken;

fn mirror(name: &'static str, latency: Duration) -> TaskRef<&'static str> {
    TaskFn::arc(name, move |_ctx: CancellationToken| async move {
        tokio::time::sleep(latency).await;
        Ok::<_, TaskError>(name)
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let tasks = vec![
        mirror("eu-1", Duration::from_millis(300)),
        mirror("us-2", Duration::from_millis(120)),
        mirror("ap-3", Duration::from_millis(450)),
    ];
    let orch = Orchestrator::new(tasks, Config::new(Mode::Race));

    let status = orch.run_to_end().await;
    println!("[race] status={}", status.as_label());
    for out in orch.outcomes() {
        println!("  data={:?} aborted={}", out.data, out.aborted);
    }

    orch.run();
    tokio::time::sleep(Duration::from_millis(50)).await;
    orch.cancel();
    println!("[race] after cancel: status={}", orch.status().as_label());
}

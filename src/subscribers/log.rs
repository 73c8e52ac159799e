//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [run-started] run=1 mode=parallel
//! [starting] run=1 task=#0 "users" attempt=1
//! [failed] run=1 task=#1 "posts" attempt=1 err="operation failed: 503"
//! [retry] run=1 task=#1 "posts" after_attempt=1 delay=0ms
//! [timeout] run=1 task=#2 "weather" timeout=5000ms
//! [succeeded] run=1 task=#0 "users" attempt=1
//! [run-finished] run=1 status=success
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

struct TaskLabel<'a>(&'a Event);

impl std::fmt::Display for TaskLabel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.index {
            Some(i) => write!(f, "#{i} {:?}", self.0.task.as_deref().unwrap_or("")),
            None => write!(f, "{:?}", self.0.task.as_deref().unwrap_or("")),
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let run = e.run.unwrap_or_default();
        let status = e.status.map(|s| s.as_label()).unwrap_or("unknown");
        let reason = e.reason.as_deref().unwrap_or("");
        let attempt = e.attempt.unwrap_or_default();

        match e.kind {
            EventKind::RunStarted => println!("[run-started] run={run} mode={reason}"),
            EventKind::RunFinished => println!("[run-finished] run={run} status={status}"),
            EventKind::RunCancelled => println!("[run-cancelled] run={run}"),
            EventKind::RaceDecided => {
                println!("[race-decided] run={run} winner={} status={status}", TaskLabel(e))
            }
            EventKind::TaskStarting => {
                println!("[starting] run={run} task={} attempt={attempt}", TaskLabel(e))
            }
            EventKind::TaskSucceeded => {
                println!("[succeeded] run={run} task={} attempt={attempt}", TaskLabel(e))
            }
            EventKind::TaskFailed => println!(
                "[failed] run={run} task={} attempt={attempt} err={reason:?}",
                TaskLabel(e)
            ),
            EventKind::TimeoutHit => println!(
                "[timeout] run={run} task={} timeout={}ms",
                TaskLabel(e),
                e.timeout_ms.unwrap_or_default()
            ),
            EventKind::RetryScheduled => println!(
                "[retry] run={run} task={} after_attempt={attempt} delay={}ms",
                TaskLabel(e),
                e.delay_ms.unwrap_or_default()
            ),
            EventKind::TaskAborted => {
                println!("[aborted] run={run} task={} attempt={attempt}", TaskLabel(e))
            }
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] {reason}")
            }
            EventKind::SubscriberPanicked => println!(
                "[subscriber-panicked] subscriber={} info={reason}",
                e.task.as_deref().unwrap_or("unknown")
            ),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

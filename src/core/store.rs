//! # Task slot store with run-scoped, serialized writes.
//!
//! Holds the authoritative [`Snapshot`] of a batch: one [`Outcome`] per task
//! index, the aggregate [`Status`] and the [`Progress`].
//!
//! ## Architecture
//! ```text
//! strategy driver ──settle(run, idx, outcome)──┐
//! strategy driver ──decide(run, idx, outcome)──┤
//! Orchestrator    ──reset(run) / finish(run)───┼──► watch::Sender<Snapshot>  (one writer at a time)
//! Orchestrator    ──abort(run)─────────────────┘            │
//!                                                           ▼
//!                                          watch::Receiver (observers, re-render)
//! ```
//!
//! ## Rules
//! - Every write goes through the channel's serialized `send_if_modified`;
//!   there is no read-modify-write outside of it.
//! - A slot is replaced **wholesale**, never patched.
//! - Writes carry the run id; a write for a superseded run is **rejected**.
//! - Writes are accepted only while the status is `Loading`; once a run is
//!   cancelled or finished, late settlements are dropped.
//! - An aborted slot is never overwritten within its run.

use tokio::sync::watch;

use super::{
    outcome::{Outcome, Status},
    progress::Progress,
};

/// Point-in-time view of a batch.
#[derive(Clone, Debug)]
pub struct Snapshot<T> {
    /// Id of the run this view belongs to (`0` before the first run).
    pub run: u64,
    /// One outcome per task index.
    pub outcomes: Vec<Outcome<T>>,
    /// Aggregate status.
    pub status: Status,
    /// Settled-over-total progress.
    pub progress: Progress,
}

impl<T> Snapshot<T> {
    fn idle(total: usize) -> Self {
        Self {
            run: 0,
            outcomes: (0..total).map(|_| Outcome::idle()).collect(),
            status: Status::Idle,
            progress: Progress::new(total),
        }
    }

    fn accepts(&self, run: u64) -> bool {
        self.run == run && self.status == Status::Loading
    }
}

/// Indexed outcome store shared by the orchestrator and its strategy drivers.
pub struct SlotStore<T> {
    tx: watch::Sender<Snapshot<T>>,
}

impl<T: Clone> SlotStore<T> {
    /// Creates a store for `total` tasks, every slot idle.
    pub fn new(total: usize) -> Self {
        let (tx, _rx) = watch::channel(Snapshot::idle(total));
        Self { tx }
    }

    /// Clones the current snapshot.
    pub fn snapshot(&self) -> Snapshot<T> {
        self.tx.borrow().clone()
    }

    /// Current aggregate status.
    pub fn status(&self) -> Status {
        self.tx.borrow().status
    }

    /// Current progress fraction.
    pub fn progress(&self) -> f64 {
        self.tx.borrow().progress.fraction()
    }

    /// Receiver notified on every accepted write.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.tx.subscribe()
    }

    /// Starts run `run`: every slot pending, progress zero, status `Loading`.
    pub(crate) fn reset(&self, run: u64) {
        self.tx.send_modify(|s| {
            let total = s.outcomes.len();
            *s = Snapshot {
                run,
                outcomes: (0..total).map(|_| Outcome::pending()).collect(),
                status: Status::Loading,
                progress: Progress::new(total),
            };
        });
    }

    /// Records the start of attempt `attempts` for one task.
    ///
    /// The slot stays loading; only pending slots of a loading run are
    /// replaced, so a settled, aborted or stale slot is never reopened.
    pub(crate) fn attempt(&self, run: u64, index: usize, attempts: u32) -> bool {
        self.tx.send_if_modified(|s| {
            if !s.accepts(run) {
                return false;
            }
            match s.outcomes.get_mut(index) {
                Some(slot) if slot.loading && !slot.aborted => {
                    *slot = Outcome::attempting(attempts);
                    true
                }
                _ => false,
            }
        })
    }

    /// Records the settlement of one task and counts it towards progress.
    ///
    /// Returns `false` when the write was rejected (stale run, run no longer
    /// loading, slot already settled or aborted).
    pub(crate) fn settle(&self, run: u64, index: usize, outcome: Outcome<T>) -> bool {
        self.tx.send_if_modified(|s| {
            if !s.accepts(run) {
                return false;
            }
            let Some(slot) = s.outcomes.get_mut(index) else {
                return false;
            };
            if !slot.loading || slot.aborted {
                return false;
            }
            *slot = outcome;
            s.progress.settle();
            true
        })
    }

    /// Records a race winner, aborts every other slot and completes progress.
    pub(crate) fn decide(&self, run: u64, winner: usize, outcome: Outcome<T>) -> bool {
        self.tx.send_if_modified(|s| {
            if !s.accepts(run) || winner >= s.outcomes.len() {
                return false;
            }
            for (i, slot) in s.outcomes.iter_mut().enumerate() {
                if i != winner {
                    *slot = std::mem::take(slot).into_aborted();
                }
            }
            s.outcomes[winner] = outcome;
            s.progress.complete();
            true
        })
    }

    /// Moves run `run` to a terminal status.
    ///
    /// `Aborted` also force-marks every still-loading slot. An empty batch
    /// reports full progress once finished.
    pub(crate) fn finish(&self, run: u64, status: Status) -> bool {
        self.tx.send_if_modified(|s| {
            if !s.accepts(run) {
                return false;
            }
            if status == Status::Aborted {
                for slot in s.outcomes.iter_mut().filter(|o| o.loading) {
                    *slot = std::mem::take(slot).into_aborted();
                }
            } else if s.outcomes.is_empty() {
                s.progress.complete();
            }
            s.status = status;
            true
        })
    }

    /// Cancels run `run`. See [`SlotStore::finish`].
    pub(crate) fn abort(&self, run: u64) -> bool {
        self.finish(run, Status::Aborted)
    }
}

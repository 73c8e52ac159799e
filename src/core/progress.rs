//! # Batch progress.
//!
//! [`Progress`] derives a completion fraction from the number of settled tasks
//! over the batch size. Within one run it only moves forward; a new run starts
//! from a fresh value.

/// Settled-over-total counter for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    settled: usize,
    total: usize,
    complete: bool,
}

impl Progress {
    /// Progress of a run over `total` tasks, nothing settled yet.
    pub fn new(total: usize) -> Self {
        Self {
            settled: 0,
            total,
            complete: false,
        }
    }

    /// Number of tasks counted as settled.
    pub fn settled(&self) -> usize {
        self.settled
    }

    /// Batch size.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Completion fraction in `[0, 1]`.
    ///
    /// An empty batch reports `0.0` until it is marked complete.
    pub fn fraction(&self) -> f64 {
        if self.complete || (self.total > 0 && self.settled >= self.total) {
            1.0
        } else if self.total == 0 {
            0.0
        } else {
            self.settled as f64 / self.total as f64
        }
    }

    /// Counts one more settled task (saturates at `total`).
    pub(crate) fn settle(&mut self) {
        self.settled = (self.settled + 1).min(self.total);
    }

    /// Jumps straight to `1.0`, as a decided race does.
    pub(crate) fn complete(&mut self) {
        self.complete = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_and_saturating() {
        let mut p = Progress::new(4);
        assert_eq!(p.fraction(), 0.0);
        p.settle();
        assert_eq!(p.fraction(), 0.25);
        for _ in 0..10 {
            p.settle();
        }
        assert_eq!(p.settled(), 4);
        assert_eq!(p.fraction(), 1.0);
    }

    #[test]
    fn complete_jumps_to_one() {
        let mut p = Progress::new(3);
        p.complete();
        assert_eq!(p.settled(), 0);
        assert_eq!(p.fraction(), 1.0);
    }

    #[test]
    fn empty_batch() {
        let mut p = Progress::new(0);
        assert_eq!(p.fraction(), 0.0);
        p.complete();
        assert_eq!(p.fraction(), 1.0);
    }
}

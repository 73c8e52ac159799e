//! # Backoff policy for retry delays.
//!
//! The delay before retry `n` (0-indexed: `n = 0` follows the first failed
//! attempt) is `first × factor^n`, clamped to `max`, then jittered. The base is
//! derived from `n` alone, so jitter never feeds back into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use batchvisor::{BackoffPolicy, JitterPolicy};
//!
//! // 500ms, 1s, 2s, ... the schedule of a classic doubling retry helper.
//! let backoff = BackoffPolicy::exponential(Duration::from_millis(500));
//!
//! assert_eq!(backoff.delay_for(0), Duration::from_millis(500));
//! assert_eq!(backoff.delay_for(1), Duration::from_secs(1));
//! assert_eq!(backoff.delay_for(2), Duration::from_secs(2));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Randomization applied to the clamped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Constant 100ms delay, capped at 30s, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Doubling delays starting at `first`, capped at 30s, no jitter.
    pub fn exponential(first: Duration) -> Self {
        Self {
            first,
            factor: 2.0,
            ..Self::default()
        }
    }

    /// Returns the policy with a different jitter strategy.
    pub fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Computes the delay before retry `retry` (0-indexed).
    ///
    /// Non-finite or negative intermediate values clamp to [`BackoffPolicy::max`].
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exp = retry.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };
        self.jitter.apply(base)
    }
}

//! # Jitter policy for retry delays.
//!
//! [`JitterPolicy`] adds randomness to backoff delays so that tasks of one batch
//! that failed together do not all retry at the same instant.
//!
//! - [`JitterPolicy::None`]: exact delays
//! - [`JitterPolicy::Full`]: random delay in `[0, delay]`
//! - [`JitterPolicy::Equal`]: `delay/2 + random[0, delay/2]`

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of retry delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact backoff delay.
    #[default]
    None,

    /// Full jitter: random delay in `[0, delay]`.
    Full,

    /// Equal jitter: `delay/2 + random[0, delay/2]`.
    Equal,
}

impl JitterPolicy {
    /// Applies jitter to the given delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return delay;
        }
        let mut rng = rand::rng();
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => Duration::from_millis(rng.random_range(0..=ms)),
            JitterPolicy::Equal => {
                let half = ms / 2;
                Duration::from_millis(half + rng.random_range(0..=half))
            }
        }
    }
}

//! # Orchestrator configuration.
//!
//! Provides [`Config`], the settings bound to one [`Orchestrator`](crate::Orchestrator)
//! instance. A config is immutable once the orchestrator is built; changing it
//! means building a new orchestrator.
//!
//! ## Sentinel values
//! - `timeout = 0s` → no per-attempt timeout
//! - `max_attempts = 0` → clamped to 1 (or rejected by [`Config::validate`])
//! - `backoff = None` → failed attempts are retried immediately

use std::time::Duration;

use crate::{error::ConfigError, policies::BackoffPolicy, strategy::Mode};

/// Configuration for a batch orchestrator.
///
/// ## Field semantics
/// - `mode`: coordination strategy used by every `run()`
/// - `max_attempts`: attempts per task per run, including the first one
/// - `timeout`: per-attempt deadline (`0s` = none)
/// - `backoff`: optional delay between attempts (`None` = retry immediately)
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct Config {
    /// Coordination strategy for the batch.
    pub mode: Mode,

    /// Maximum attempts per task (`>= 1`).
    pub max_attempts: u32,

    /// Per-attempt timeout.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = each attempt races against a deadline timer
    pub timeout: Duration,

    /// Optional delay between a failed attempt and the next one.
    pub backoff: Option<BackoffPolicy>,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a config for the given mode with all other fields defaulted.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Returns the config with a different mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the config with a different attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Returns the config with a per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the config with an inter-attempt backoff.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Returns the per-attempt timeout as an `Option`.
    #[inline]
    pub fn attempt_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns `max_attempts` clamped to a minimum of 1.
    #[inline]
    pub fn attempts_clamped(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Rejects configurations that would otherwise be silently clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `mode = Mode::Parallel`
    /// - `max_attempts = 1` (no retry)
    /// - `timeout = 0s` (no timeout)
    /// - `backoff = None` (immediate retry)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            mode: Mode::Parallel,
            max_attempts: 1,
            timeout: Duration::ZERO,
            backoff: None,
            bus_capacity: 1024,
        }
    }
}

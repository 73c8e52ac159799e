//! Error types used by the batchvisor runtime and tasks.
//!
//! This module defines two error enums:
//!
//! - [`TaskError`]: failures of individual task executions; stored verbatim in
//!   each task's [`Outcome`](crate::Outcome).
//! - [`ConfigError`]: invalid orchestrator configuration.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by task execution.
///
/// Task errors never escape the orchestrator: the retry executor captures them
/// and the active mode strategy records them in the task's outcome slot.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The operation itself failed; carries its original message.
    #[error("operation failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// A single attempt exceeded the configured deadline.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// The retry loop was pre-empted by a tripped cancellation token.
    #[error("aborted")]
    Aborted,
}

impl TaskError {
    /// Wraps any displayable failure as [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use batchvisor::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert_eq!(err.to_string(), "operation failed: connection refused");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use batchvisor::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Aborted => "task_aborted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Aborted => "aborted by cancellation".to_string(),
        }
    }

    /// True for [`TaskError::Aborted`].
    pub fn is_aborted(&self) -> bool {
        matches!(self, TaskError::Aborted)
    }

    /// True for [`TaskError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout { .. })
    }
}

/// # Errors produced by configuration validation.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_attempts` was zero; at least one attempt is required.
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroAttempts => "config_zero_attempts",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(TaskError::fail("x").as_label(), "task_failed");
        assert_eq!(TaskError::Aborted.as_label(), "task_aborted");
        assert_eq!(ConfigError::ZeroAttempts.as_label(), "config_zero_attempts");
    }

    #[test]
    fn fail_keeps_original_message() {
        let err = TaskError::fail(std::io::Error::other("503 Service Unavailable"));
        assert_eq!(
            err,
            TaskError::Fail {
                error: "503 Service Unavailable".into()
            }
        );
        assert_eq!(err.as_message(), "error: 503 Service Unavailable");
        assert!(!err.is_aborted());
        assert!(!err.is_timeout());
    }
}

//! Retry pacing policies.
//!
//! By default the retry executor re-attempts a failed task immediately. These
//! policies opt into a delay between attempts instead.
//!
//! ## Contents
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization strategy to avoid synchronized retries
//!
//! ## Quick wiring
//! ```text
//! Config { backoff: Option<BackoffPolicy>, .. }
//!      └─► retry executor, after failed attempt n (n < max_attempts):
//!           - None       → next attempt immediately
//!           - Some(p)    → sleep(p.delay_for(n - 1)), cancellable
//! ```

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;

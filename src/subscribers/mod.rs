//! # Event subscribers for the batchvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and (behind the `logging` feature) a built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//!   retry loop ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                           │
//!                                               ┌───────────┼───────────┐
//!                                               ▼           ▼           ▼
//!                                           LogWriter    Metrics      Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use batchvisor::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::TaskFailed {
//!             // increment failure counter
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;

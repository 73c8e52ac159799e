//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the orchestrator, the retry executor
//! and the subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Orchestrator` (run/cancel/finish), retry executor
//!   (attempts, timeouts, retries), race strategy, `SubscriberSet` workers.
//! - **Consumers**: the orchestrator's listener task, which fans out to the
//!   `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

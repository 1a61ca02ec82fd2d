//! # Diagnostic sinks for the lifecycle manager.
//!
//! This module provides the [`Subscribe`] trait and the built-in [`LogWriter`]
//! for handling [`Event`](crate::Event)s emitted during a run.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Manager / runner tasks ── emit(Event) ──► SubscriberSet
//!                                                  │
//!                                         ┌────────┼────────┐
//!                                         ▼        ▼        ▼
//!                                     LogWriter  Metrics  Custom ...
//! ```
//!
//! A manager with no subscribers is silent: diagnostics never affect control flow.
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use cyclevisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct Alerts;
//!
//! #[async_trait]
//! impl Subscribe for Alerts {
//!     async fn on_event(&self, event: &Event) {
//!         if event.is_failure() {
//!             // page someone
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "alerts" }
//! }
//! ```

mod log;
mod subscriber;
mod subscriber_set;

pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
pub(crate) use subscriber_set::DEFAULT_DRAIN_TIMEOUT;

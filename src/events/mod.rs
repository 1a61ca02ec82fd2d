//! Diagnostic events emitted by the lifecycle manager.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publishers**: `Manager::run` (phase transitions, failures), runner tasks
//!   (start failures and panics), the termination task, and `harness::test_main`.
//! - **Consumers**: every [`Subscribe`](crate::Subscribe) registered on the manager,
//!   reached through a [`SubscriberSet`](crate::SubscriberSet).

mod event;

pub use event::{Event, EventKind};

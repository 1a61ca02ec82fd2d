//! # cyclevisor
//!
//! **Cyclevisor** is a phased lifecycle manager for in-process components.
//!
//! A program registers components (database pools, HTTP servers, background
//! workers, ...) with a [`Manager`]. Each component optionally implements
//! [`Setup`], [`Start`] and [`Close`]. One call to [`Manager::run`] sets them up in
//! order, starts them concurrently, waits for a termination request or the first
//! runner failure, and closes them in reverse order. The result is a single
//! [`Termination`] cause that maps to a stable signal number for the process
//! exit code.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Component   │   │  Component   │   │  Component   │
//!     │ setup/close  │   │ setup/start  │   │    start     │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Manager (runs once)                                              │
//! │  - ManagerConfig (setup/close timeouts)                           │
//! │  - TerminationSource (OS interrupt by default)                    │
//! │  - SubscriberSet (fans out diagnostic events)                     │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     setup (seq)       runner task        runner task         │
//!     race_with_timeout  (detached)         (detached)         │
//!                           │ StartFailed      │               │ Signal(v)
//!                           ▼                  ▼               ▼
//!                     ┌──────────────────────────────────────────────┐
//!                     │     arbiter: capacity-1 slot, first wins     │
//!                     └──────────────────────┬───────────────────────┘
//!                                            ▼
//!                            stop token cancelled, close (reverse)
//!                                            ▼
//!                                       Termination
//! ```
//!
//! ### Exit codes
//! ```text
//! Signal(v)                      → v
//! SetupTimedOut | CloseTimedOut  → SIGALRM (14)
//! *Failed                        → SIGABRT (6)
//! harness probe failure          → SIGUSR1 (10)
//! ```
//!
//! ## Features
//! | Area              | Description                                                      | Key types / traits                          |
//! |-------------------|------------------------------------------------------------------|---------------------------------------------|
//! | **Components**    | Capability traits and closure adapters.                          | [`Component`], [`Setup`], [`Start`], [`Close`] |
//! | **Lifecycle**     | Phased run with timeouts and first-wins termination.             | [`Manager`], [`Termination`]                |
//! | **Configuration** | Timeouts and start-failure policy.                               | [`ManagerConfig`], [`ManagerBuilder`]       |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, custom sinks).     | [`Subscribe`], [`LogWriter`]                |
//! | **Probes**        | Readiness checks with retry and fan-out combinators.             | [`Probe`], [`RetryingProbe`], [`ParallelProbe`] |
//! | **Harness**       | Gate an acceptance-test suite on fixture readiness.              | [`test_main`], [`TestSuite`]                |
//! | **Errors**        | Typed errors for components and probes.                          | [`ComponentError`], [`ProbeError`]          |
//!
//! ## Example
//! ```rust,no_run
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use cyclevisor::{Component, ComponentError, Manager, ManagerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut cfg = ManagerConfig::default();
//!     cfg.close_timeout = Duration::from_secs(10);
//!
//!     let mut manager = Manager::builder(cfg).build();
//!     manager.add("worker", Component::start_fn(|stop: CancellationToken| async move {
//!         stop.cancelled().await;
//!         Ok::<_, ComponentError>(())
//!     }));
//!
//!     // Blocks until SIGINT/SIGTERM (or Ctrl-C), then closes everything.
//!     let cause = manager.run().await;
//!     std::process::exit(cause.signal());
//! }
//! ```
mod components;
mod core;
mod error;
mod events;
mod harness;
mod probes;
mod subscribers;

// ---- Public re-exports ----

pub use crate::components::{
    Capabilities, Close, CloseFn, Component, NamedComponent, Setup, SetupFn, Start, StartFn,
};
pub use crate::core::{
    InterruptSignal, Manager, ManagerBuilder, ManagerConfig, SIGABRT, SIGALRM, SIGUSR1,
    Termination, TerminationFn, TerminationSource,
};
pub use crate::error::{ComponentError, ProbeError};
pub use crate::events::{Event, EventKind};
pub use crate::harness::{SuiteFn, TestSuite, test_main};
pub use crate::probes::{DoneReason, ParallelProbe, Probe, ProbeContext, ProbeFn, RetryingProbe};
pub use crate::subscribers::{LogWriter, Subscribe, SubscriberSet};

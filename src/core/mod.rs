//! Runtime core: phases, arbitration and termination.
//!
//! The public API from this module is [`Manager`] (built through [`ManagerBuilder`]
//! from a [`ManagerConfig`]) and the [`Termination`] it returns.
//!
//! Internal modules:
//! - [`manager`]: drives setup → start → wait → close;
//! - [`race`]: runs one setup/close call against a timeout with panic containment;
//! - [`arbiter`]: single-slot, first-writer-wins termination cause;
//! - [`termination`]: termination causes, signal mapping, termination sources;
//! - [`shutdown`]: cross-platform OS interrupt handling.

mod arbiter;
mod builder;
mod config;
mod manager;
mod race;
mod shutdown;
mod termination;

pub use builder::ManagerBuilder;
pub use config::ManagerConfig;
pub use manager::Manager;
pub use shutdown::InterruptSignal;
pub use termination::{SIGABRT, SIGALRM, SIGUSR1, Termination, TerminationFn, TerminationSource};

//! # Manager configuration.
//!
//! Provides [`ManagerConfig`] the per-manager settings, constructed explicitly when
//! the manager is built (there is no process-wide default state).
//!
//! The termination source and the diagnostic sinks are not plain data and are set
//! on [`ManagerBuilder`](crate::ManagerBuilder) instead.

use std::time::Duration;

use crate::subscribers::DEFAULT_DRAIN_TIMEOUT;

/// Configuration for a [`Manager`](crate::Manager).
///
/// ## Field semantics
/// - `setup_timeout`: time **each** component has to finish setup
/// - `close_timeout`: time **each** component has to finish close
/// - `start_failure_terminates`: whether a failing runner may end the run
/// - `drain_timeout`: how long diagnostics may delay the return of `run`
///
/// A zero timeout is legal; any call that does not complete immediately times out.
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    /// Maximum time a single setup call may take.
    ///
    /// On timeout the run ends with `Termination::SetupTimedOut`; remaining
    /// components are neither set up nor started.
    pub setup_timeout: Duration,

    /// Maximum time a single close call may take.
    ///
    /// On timeout the close phase stops and the run ends with
    /// `Termination::CloseTimedOut`, overriding the wait-phase cause.
    pub close_timeout: Duration,

    /// Whether a runner error or panic is offered as the run's termination cause.
    ///
    /// - `true` (default): the first runner failure ends the run unless a signal won first
    /// - `false`: runner failures are only logged; the run waits for the termination source
    pub start_failure_terminates: bool,

    /// Maximum time `run` waits for subscribers to process queued events before returning.
    ///
    /// Subscribers still busy afterwards are aborted; their remaining events are lost.
    pub drain_timeout: Duration,
}

impl Default for ManagerConfig {
    /// Default configuration:
    ///
    /// - `setup_timeout = 5s`
    /// - `close_timeout = 5s`
    /// - `start_failure_terminates = true`
    /// - `drain_timeout = 1s`
    fn default() -> Self {
        Self {
            setup_timeout: Duration::from_secs(5),
            close_timeout: Duration::from_secs(5),
            start_failure_terminates: true,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }
}

//! # Diagnostic events emitted during a run.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Setup events**: a component is being set up, or its setup failed/timed out
//! - **Start events**: a runner is launched, stopped, failed or panicked
//! - **Termination events**: the winning termination cause, and causes that lost the race
//! - **Close events**: a component is being closed, or its close failed/timed out
//!
//! The [`Event`] struct carries additional metadata such as timestamps, component
//! name, failure reason, timeout and signal value.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events from different tasks interleave.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use cyclevisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::SetupTimedOut)
//!     .with_component("database")
//!     .with_timeout(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::SetupTimedOut);
//! assert_eq!(ev.component.as_deref(), Some("database"));
//! assert_eq!(ev.timeout_ms, Some(5_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of diagnostic events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Setup phase ===
    /// Setup of a component is about to be called.
    ///
    /// Sets:
    /// - `component`: component name
    SetupStarting,

    /// Setup of a component returned an error (or panicked).
    ///
    /// Sets:
    /// - `component`: component name
    /// - `reason`: error message
    SetupFailed,

    /// Setup of a component exceeded the setup timeout.
    ///
    /// Sets:
    /// - `component`: component name
    /// - `timeout_ms`: configured setup timeout (ms)
    SetupTimedOut,

    // === Start phase ===
    /// A runner is being launched on its own task.
    ///
    /// Sets:
    /// - `component`: component name
    ComponentStarting,

    /// A runner returned `Ok(())`.
    ///
    /// Sets:
    /// - `component`: component name
    ComponentStopped,

    /// A runner returned an error.
    ///
    /// Sets:
    /// - `component`: component name
    /// - `reason`: error message
    StartFailed,

    /// A runner panicked; the panic was contained.
    ///
    /// Sets:
    /// - `component`: component name
    /// - `reason`: panic message
    StartPanicked,

    // === Termination ===
    /// The run's termination cause has been decided.
    ///
    /// Sets:
    /// - `signal`: signal value of the winning cause
    /// - `reason`: cause label
    TerminationReceived,

    /// A cause arrived after another one had already won; it is ignored.
    ///
    /// Sets:
    /// - `signal`: signal value of the dropped cause
    /// - `reason`: cause label
    CauseDropped,

    // === Close phase ===
    /// Close of a component is about to be called.
    ///
    /// Sets:
    /// - `component`: component name
    CloseStarting,

    /// Close of a component returned an error (or panicked).
    ///
    /// Sets:
    /// - `component`: component name
    /// - `reason`: error message
    CloseFailed,

    /// Close of a component exceeded the close timeout.
    ///
    /// Sets:
    /// - `component`: component name
    /// - `timeout_ms`: configured close timeout (ms)
    CloseTimedOut,

    /// `Manager::run` is about to return.
    ///
    /// Sets:
    /// - `signal`: returned signal value
    /// - `reason`: returned cause label
    RunFinished,

    // === Test harness ===
    /// The readiness probe failed; tests were not run.
    ///
    /// Sets:
    /// - `reason`: probe error message
    ProbeFailed,
}

/// Diagnostic event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the component, if applicable.
    pub component: Option<Arc<str>>,
    /// Human-readable reason (errors, cause labels, etc.).
    pub reason: Option<Arc<str>>,
    /// Phase timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Signal value of a termination cause.
    pub signal: Option<i32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            component: None,
            reason: None,
            timeout_ms: None,
            signal: None,
        }
    }

    /// Attaches a component name.
    #[inline]
    pub fn with_component(mut self, component: impl Into<Arc<str>>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches a signal value.
    #[inline]
    pub fn with_signal(mut self, signal: i32) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Returns `true` for events reporting a failure or timeout.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SetupFailed
                | EventKind::SetupTimedOut
                | EventKind::StartFailed
                | EventKind::StartPanicked
                | EventKind::CloseFailed
                | EventKind::CloseTimedOut
                | EventKind::ProbeFailed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::SetupStarting);
        let b = Event::new(EventKind::SetupStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_timeout_is_clamped() {
        let ev = Event::new(EventKind::CloseTimedOut).with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(ev.timeout_ms, Some(u32::MAX));
    }

    #[test]
    fn test_failure_classification() {
        assert!(Event::new(EventKind::StartPanicked).is_failure());
        assert!(!Event::new(EventKind::TerminationReceived).is_failure());
    }
}

//! # LogWriter: structured event logger
//!
//! The default diagnostic sink. Every [`Event`] becomes one `tracing` event with
//! key/value fields; where it ends up is decided by the `tracing` subscriber the
//! host installed (e.g. `tracing_subscriber::fmt()` writing to stdout).
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO  cyclevisor: setting up component component="database"
//! ERROR cyclevisor: setup timed out component="cache" timeout_ms=5000
//! INFO  cyclevisor: starting component component="http"
//! INFO  cyclevisor: termination cause received signal=0 cause="signal"
//! INFO  cyclevisor: closing component component="http"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let component = e.component.as_deref().unwrap_or("");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::SetupStarting => {
                tracing::info!(target: "cyclevisor", component, "setting up component");
            }
            EventKind::SetupFailed => {
                tracing::error!(target: "cyclevisor", component, error = reason, "failure during setup");
            }
            EventKind::SetupTimedOut => {
                tracing::error!(target: "cyclevisor", component, timeout_ms = e.timeout_ms, "setup timed out");
            }
            EventKind::ComponentStarting => {
                tracing::info!(target: "cyclevisor", component, "starting component");
            }
            EventKind::ComponentStopped => {
                tracing::info!(target: "cyclevisor", component, "component stopped");
            }
            EventKind::StartFailed => {
                tracing::error!(target: "cyclevisor", component, error = reason, "failure during start");
            }
            EventKind::StartPanicked => {
                tracing::error!(target: "cyclevisor", component, error = reason, "panic during start");
            }
            EventKind::TerminationReceived => {
                tracing::info!(target: "cyclevisor", signal = e.signal, cause = reason, "termination cause received");
            }
            EventKind::CauseDropped => {
                tracing::warn!(target: "cyclevisor", signal = e.signal, cause = reason, "termination cause already decided; ignoring");
            }
            EventKind::CloseStarting => {
                tracing::info!(target: "cyclevisor", component, "closing component");
            }
            EventKind::CloseFailed => {
                tracing::error!(target: "cyclevisor", component, error = reason, "failure during close");
            }
            EventKind::CloseTimedOut => {
                tracing::error!(target: "cyclevisor", component, timeout_ms = e.timeout_ms, "close timed out");
            }
            EventKind::RunFinished => {
                tracing::info!(target: "cyclevisor", signal = e.signal, cause = reason, "run finished");
            }
            EventKind::ProbeFailed => {
                tracing::error!(target: "cyclevisor", error = reason, "unable to run tests due to prober failing");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

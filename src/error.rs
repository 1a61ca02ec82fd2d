//! Error types used by the lifecycle manager, components and probes.
//!
//! This module defines two main error enums:
//!
//! - [`ComponentError`] - errors raised by a component capability (setup/start/close).
//! - [`ProbeError`] - errors returned by readiness probes and their combinators.
//!
//! Both types provide `as_label` for logging: a short stable snake_case string.

use std::time::Duration;
use thiserror::Error;

use crate::probes::DoneReason;

/// # Errors produced by component capabilities.
///
/// Returned by [`Setup`](crate::Setup), [`Start`](crate::Start) and [`Close`](crate::Close)
/// implementations, and by the manager itself when a call panics or runs out of time.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// The capability returned an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The capability panicked; the panic was caught by the manager.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// The capability did not complete within its timeout.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },
}

impl ComponentError {
    /// Shorthand for [`ComponentError::Fail`].
    ///
    /// # Example
    /// ```
    /// use cyclevisor::ComponentError;
    ///
    /// let err = ComponentError::fail("connection refused");
    /// assert_eq!(err.to_string(), "execution failed: connection refused");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        ComponentError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ComponentError::Fail { .. } => "component_failed",
            ComponentError::Panicked { .. } => "component_panicked",
            ComponentError::Timeout { .. } => "component_timeout",
        }
    }

    /// Indicates whether the error is a timeout produced by the manager.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ComponentError::Timeout { .. })
    }

    /// Renders a caught panic payload into [`ComponentError::Panicked`].
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let info = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        ComponentError::Panicked { info }
    }
}

/// # Errors produced by readiness probes.
///
/// A plain probe reports [`ProbeError::Failed`]; the combinators add their own
/// classifications so callers can tell "never became ready" apart from "was cancelled".
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The probe ran and reported the dependency as not ready.
    #[error("probe failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// A retrying probe ran out of time before any attempt succeeded.
    #[error("prober timed out after {deadline:?}")]
    DeadlineExceeded {
        /// The configured overall deadline.
        deadline: Duration,
    },

    /// A retrying probe was cancelled by its caller.
    #[error("retrying prober failed: context cancelled")]
    Cancelled,

    /// A member of a parallel probe failed; the siblings were cancelled.
    #[error("parallel prober errored: {source}")]
    MemberFailed {
        /// The first failure observed.
        #[source]
        source: Box<ProbeError>,
    },

    /// The caller's context ended before a parallel probe completed.
    #[error("parallel prober timed out: {reason}")]
    TimedOut {
        /// Whether the caller cancelled or its deadline passed.
        reason: DoneReason,
    },
}

impl ProbeError {
    /// Shorthand for [`ProbeError::Failed`].
    pub fn fail(error: impl Into<String>) -> Self {
        ProbeError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use cyclevisor::ProbeError;
    ///
    /// assert_eq!(ProbeError::Cancelled.as_label(), "probe_cancelled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ProbeError::Failed { .. } => "probe_failed",
            ProbeError::DeadlineExceeded { .. } => "probe_deadline_exceeded",
            ProbeError::Cancelled => "probe_cancelled",
            ProbeError::MemberFailed { .. } => "probe_member_failed",
            ProbeError::TimedOut { .. } => "probe_timed_out",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payload_is_rendered() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(
            ComponentError::from_panic(payload.as_ref()),
            ComponentError::Panicked {
                info: "boom".into()
            }
        );

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(
            ComponentError::from_panic(payload.as_ref()),
            ComponentError::Panicked {
                info: "bang".into()
            }
        );

        let payload: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert_eq!(
            ComponentError::from_panic(payload.as_ref()),
            ComponentError::Panicked {
                info: "unknown panic".into()
            }
        );
    }

    #[test]
    fn test_member_failure_keeps_source() {
        let err = ProbeError::MemberFailed {
            source: Box::new(ProbeError::DeadlineExceeded {
                deadline: Duration::from_millis(500),
            }),
        };
        assert_eq!(err.as_label(), "probe_member_failed");
        assert!(err.to_string().starts_with("parallel prober errored"));
        assert!(err.to_string().contains("prober timed out"));
    }
}

//! # Termination causes and termination sources.
//!
//! [`Termination`] is the single reason `Manager::run` returned. It converts to a
//! POSIX-style signal number with a stable mapping, so a process can exit with a
//! code that tells operators what happened without reading logs:
//!
//! ```text
//! Signal(v)                        → v         (clean, externally requested)
//! SetupTimedOut | CloseTimedOut    → SIGALRM   (hung dependency)
//! SetupFailed | StartFailed |
//! CloseFailed                      → SIGABRT   (operational failure)
//! ```
//!
//! [`TerminationSource`] is what the wait phase blocks on. The default is
//! [`InterruptSignal`](crate::InterruptSignal); tests plug in a [`TerminationFn`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ComponentError;

/// Abort signal number: operational failure.
pub const SIGABRT: i32 = 6;
/// User signal 1: the test harness probe failed and tests were not run.
pub const SIGUSR1: i32 = 10;
/// Alarm signal number: a setup or close call timed out.
pub const SIGALRM: i32 = 14;

/// The reason a run ended. Exactly one is produced per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The termination source returned this value (usually `0` for an OS interrupt).
    Signal(i32),
    /// A setup call returned an error or panicked.
    SetupFailed {
        /// Failing component.
        component: Arc<str>,
        /// Its error.
        error: ComponentError,
    },
    /// A setup call exceeded the setup timeout.
    SetupTimedOut {
        /// Slow component.
        component: Arc<str>,
        /// The exceeded timeout.
        timeout: Duration,
    },
    /// A runner returned an error or panicked before any other cause was recorded.
    StartFailed {
        /// Failing component.
        component: Arc<str>,
        /// Its error ([`ComponentError::Panicked`] for a contained panic).
        error: ComponentError,
    },
    /// A close call returned an error or panicked.
    CloseFailed {
        /// Failing component.
        component: Arc<str>,
        /// Its error.
        error: ComponentError,
    },
    /// A close call exceeded the close timeout.
    CloseTimedOut {
        /// Slow component.
        component: Arc<str>,
        /// The exceeded timeout.
        timeout: Duration,
    },
}

impl Termination {
    /// Returns the signal number for process exit-code purposes.
    ///
    /// The mapping is stable across versions.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use cyclevisor::{Termination, SIGALRM};
    ///
    /// assert_eq!(Termination::Signal(0).signal(), 0);
    /// let slow = Termination::SetupTimedOut { component: "db".into(), timeout: Duration::from_secs(5) };
    /// assert_eq!(slow.signal(), SIGALRM);
    /// ```
    pub fn signal(&self) -> i32 {
        match self {
            Termination::Signal(v) => *v,
            Termination::SetupTimedOut { .. } | Termination::CloseTimedOut { .. } => SIGALRM,
            Termination::SetupFailed { .. }
            | Termination::StartFailed { .. }
            | Termination::CloseFailed { .. } => SIGABRT,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Termination::Signal(_) => "signal",
            Termination::SetupFailed { .. } => "setup_failed",
            Termination::SetupTimedOut { .. } => "setup_timed_out",
            Termination::StartFailed { .. } => "start_failed",
            Termination::CloseFailed { .. } => "close_failed",
            Termination::CloseTimedOut { .. } => "close_timed_out",
        }
    }

    /// Returns the component responsible for the cause, if any.
    pub fn component(&self) -> Option<&str> {
        match self {
            Termination::Signal(_) => None,
            Termination::SetupFailed { component, .. }
            | Termination::SetupTimedOut { component, .. }
            | Termination::StartFailed { component, .. }
            | Termination::CloseFailed { component, .. }
            | Termination::CloseTimedOut { component, .. } => Some(&**component),
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Signal(v) => write!(f, "received signal {v}"),
            Termination::SetupFailed { component, error } => {
                write!(f, "setup of {component:?} failed: {error}")
            }
            Termination::SetupTimedOut { component, timeout } => {
                write!(f, "setup of {component:?} timed out after {timeout:?}")
            }
            Termination::StartFailed { component, error } => {
                write!(f, "start of {component:?} failed: {error}")
            }
            Termination::CloseFailed { component, error } => {
                write!(f, "close of {component:?} failed: {error}")
            }
            Termination::CloseTimedOut { component, timeout } => {
                write!(f, "close of {component:?} timed out after {timeout:?}")
            }
        }
    }
}

/// Supplies the external termination request the wait phase blocks on.
#[async_trait]
pub trait TerminationSource: Send + Sync + 'static {
    /// Waits until termination is requested and returns the signal value to report.
    async fn wait(&self) -> i32;
}

/// Closure-backed [`TerminationSource`].
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use cyclevisor::{Manager, ManagerConfig, TerminationFn};
///
/// let manager = Manager::builder(ManagerConfig::default())
///     .with_termination(Arc::new(TerminationFn::new(|| async { 0 })))
///     .build();
/// ```
#[derive(Debug)]
pub struct TerminationFn<F> {
    f: F,
}

impl<F> TerminationFn<F> {
    /// Wraps a closure returning a fresh wait future per call.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> TerminationSource for TerminationFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = i32> + Send + 'static,
{
    async fn wait(&self) -> i32 {
        (self.f)().await
    }
}

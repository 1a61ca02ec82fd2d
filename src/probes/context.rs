//! # Cancellation and deadline scope for probes.
//!
//! A [`ProbeContext`] pairs a [`CancellationToken`] with an optional deadline.
//! Derived contexts form a tree:
//!
//! ```text
//! background ──with_timeout(1s)──► retry ctx ──with_deadline(next tick)──► attempt ctx
//!      │                               │                                      │
//!  cancel() ───────── propagates ──────┴──────────── propagates ──────────────┘
//! ```
//!
//! - cancelling a context cancels every context derived from it, never its parent;
//! - a derived deadline is the earlier of the parent's and the requested one.

use std::fmt;
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// Why a [`ProbeContext`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneReason {
    /// The context (or an ancestor) was cancelled.
    Cancelled,
    /// The context's deadline passed.
    DeadlineExceeded,
}

impl fmt::Display for DoneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoneReason::Cancelled => f.write_str("context cancelled"),
            DoneReason::DeadlineExceeded => f.write_str("context deadline exceeded"),
        }
    }
}

/// Cancellation token plus optional deadline handed to every probe call.
#[derive(Clone, Debug, Default)]
pub struct ProbeContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ProbeContext {
    /// A root context: never cancelled unless [`cancel`](Self::cancel) is called, no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derives a context cancelled together with `self`.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derives a context ending at `deadline` at the latest.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Derives a context ending `timeout` from now at the latest.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Cancels this context and everything derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The effective deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The underlying token, for handing to code that only understands tokens.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns why the context ended, or `None` while it is still live.
    pub fn done_reason(&self) -> Option<DoneReason> {
        if self.deadline_passed() {
            Some(DoneReason::DeadlineExceeded)
        } else if self.token.is_cancelled() {
            Some(DoneReason::Cancelled)
        } else {
            None
        }
    }

    /// Returns `true` once the context ended.
    pub fn is_done(&self) -> bool {
        self.done_reason().is_some()
    }

    /// Resolves when the context ends.
    pub async fn done(&self) -> DoneReason {
        if self.deadline_passed() {
            return DoneReason::DeadlineExceeded;
        }
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = time::sleep_until(deadline) => DoneReason::DeadlineExceeded,
                _ = self.token.cancelled() => DoneReason::Cancelled,
            },
            None => {
                self.token.cancelled().await;
                DoneReason::Cancelled
            }
        }
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

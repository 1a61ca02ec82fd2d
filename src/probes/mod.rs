//! # Readiness probes and their combinators.
//!
//! A [`Probe`] answers "is this dependency ready yet?" within the bounds of a
//! [`ProbeContext`]. The combinators build readiness gates out of simple checks:
//!
//! - [`RetryingProbe`]: retry one probe on a fixed cadence until success or deadline;
//! - [`ParallelProbe`]: run several probes concurrently, all must succeed.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use cyclevisor::{ParallelProbe, Probe, ProbeContext, ProbeError, ProbeFn, RetryingProbe};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let database = ProbeFn::new(|_ctx: ProbeContext| async { Ok::<_, ProbeError>(()) });
//! let cache = ProbeFn::new(|_ctx: ProbeContext| async { Ok::<_, ProbeError>(()) });
//!
//! let ready = ParallelProbe::new(Vec::new())
//!     .with(RetryingProbe::new(Duration::from_millis(10), Duration::from_secs(1), database))
//!     .with(RetryingProbe::new(Duration::from_millis(10), Duration::from_secs(1), cache));
//!
//! assert!(ready.probe(&ProbeContext::background()).await.is_ok());
//! # }
//! ```

mod context;
mod parallel;
mod probe;
mod retrying;

pub use context::{DoneReason, ProbeContext};
pub use parallel::ParallelProbe;
pub use probe::{Probe, ProbeFn};
pub use retrying::RetryingProbe;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{Probe, ProbeContext};
    use crate::error::ProbeError;

    /// Probe that fails until its `success_after`-th call, optionally sleeping first.
    pub(crate) struct CountingProbe {
        success_after: u64,
        work: Duration,
        calls: AtomicU64,
    }

    impl CountingProbe {
        pub(crate) fn succeeding_after(success_after: u64) -> Self {
            Self {
                success_after,
                work: Duration::ZERO,
                calls: AtomicU64::new(0),
            }
        }

        pub(crate) fn with_work(mut self, work: Duration) -> Self {
            self.work = work;
            self
        }

        pub(crate) fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Probe for CountingProbe {
        async fn probe(&self, _ctx: &ProbeContext) -> Result<(), ProbeError> {
            if !self.work.is_zero() {
                tokio::time::sleep(self.work).await;
            }
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < self.success_after {
                return Err(ProbeError::fail("not ready"));
            }
            Ok(())
        }
    }
}

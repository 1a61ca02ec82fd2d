//! # RetryingProbe: retry a probe on a fixed cadence until it succeeds or time runs out.
//!
//! ```text
//! t=0        t=i         t=2i        t=3i   ...   deadline
//!  │          │ attempt 1 │ attempt 2 │            │
//!  │          ├──────────►├──────────►├─ ...       ├─► DeadlineExceeded
//!  │          (each attempt's context ends at the next tick)
//!  └─ outer ctx cancelled at any point ─────────────────► Cancelled
//! ```
//!
//! - The first attempt happens one interval after the call, not immediately.
//! - An attempt still running at the next tick is abandoned.
//! - Ticks missed while an attempt ran are skipped, not replayed in a burst.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::error::ProbeError;
use crate::probes::{DoneReason, Probe, ProbeContext};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Retries the wrapped probe every `interval` until it succeeds or `deadline` passes.
pub struct RetryingProbe {
    interval: Duration,
    deadline: Duration,
    probe: Arc<dyn Probe>,
}

impl RetryingProbe {
    /// Creates a retrying probe.
    ///
    /// An `interval` shorter than 1ms (including zero) is raised to 1ms.
    pub fn new(interval: Duration, deadline: Duration, probe: impl Probe) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
            deadline,
            probe: Arc::new(probe),
        }
    }

    fn give_up(&self, reason: DoneReason) -> ProbeError {
        match reason {
            DoneReason::DeadlineExceeded => ProbeError::DeadlineExceeded {
                deadline: self.deadline,
            },
            DoneReason::Cancelled => ProbeError::Cancelled,
        }
    }
}

#[async_trait]
impl Probe for RetryingProbe {
    async fn probe(&self, outer: &ProbeContext) -> Result<(), ProbeError> {
        let ctx = outer.with_timeout(self.deadline);
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut attempt_no = 0u32;

        loop {
            let tick = tokio::select! {
                biased;
                reason = ctx.done() => return Err(self.give_up(reason)),
                tick = ticker.tick() => tick,
            };
            attempt_no += 1;

            let attempt = ctx.with_deadline(tick + self.interval);
            let outcome = tokio::select! {
                biased;
                res = self.probe.probe(&attempt) => Some(res),
                _ = attempt.done() => None,
            };
            attempt.cancel();

            match outcome {
                Some(Ok(())) => return Ok(()),
                Some(Err(err)) => {
                    tracing::debug!(attempt = attempt_no, error = %err, "probe not ready; retrying");
                }
                None => {
                    tracing::debug!(attempt = attempt_no, "probe attempt abandoned at next tick");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::testing::CountingProbe;

    const INTERVAL: Duration = Duration::from_millis(100);
    const DEADLINE: Duration = Duration::from_millis(1050);

    #[tokio::test(start_paused = true)]
    async fn test_never_succeeding_probe_hits_deadline() {
        let inner = Arc::new(CountingProbe::succeeding_after(11));
        let probe = RetryingProbe::new(INTERVAL, DEADLINE, inner.clone());

        let res = probe.probe(&ProbeContext::background()).await;

        assert_eq!(res, Err(ProbeError::DeadlineExceeded { deadline: DEADLINE }));
        assert_eq!(inner.calls(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_context_stops_retrying() {
        let inner = Arc::new(CountingProbe::succeeding_after(11));
        let probe = RetryingProbe::new(INTERVAL, DEADLINE, inner.clone());
        let ctx = ProbeContext::background();

        let canceller = ctx.clone();
        tokio::spawn(async move {
            time::sleep(DEADLINE / 2).await;
            canceller.cancel();
        });

        let res = probe.probe(&ctx).await;

        assert_eq!(res, Err(ProbeError::Cancelled));
        assert_eq!(res.unwrap_err().to_string(), "retrying prober failed: context cancelled");
        assert_eq!(inner.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_on_first_success() {
        let inner = Arc::new(CountingProbe::succeeding_after(9));
        let probe = RetryingProbe::new(INTERVAL, DEADLINE, inner.clone());

        assert_eq!(probe.probe(&ProbeContext::background()).await, Ok(()));
        assert_eq!(inner.calls(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_attempts_are_abandoned_at_next_tick() {
        let inner = Arc::new(CountingProbe::succeeding_after(0).with_work(Duration::from_millis(250)));
        let probe = RetryingProbe::new(INTERVAL, DEADLINE, inner.clone());

        let res = probe.probe(&ProbeContext::background()).await;

        assert_eq!(res, Err(ProbeError::DeadlineExceeded { deadline: DEADLINE }));
        assert_eq!(inner.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_outer_deadline_caps_retry_deadline() {
        let inner = Arc::new(CountingProbe::succeeding_after(11));
        let probe = RetryingProbe::new(INTERVAL, DEADLINE, inner.clone());
        let ctx = ProbeContext::background().with_timeout(Duration::from_millis(350));

        let res = probe.probe(&ctx).await;

        assert!(matches!(res, Err(ProbeError::DeadlineExceeded { .. })));
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let inner = Arc::new(CountingProbe::succeeding_after(3));
        let probe = RetryingProbe::new(Duration::ZERO, DEADLINE, inner.clone());

        assert_eq!(probe.probe(&ProbeContext::background()).await, Ok(()));
        assert_eq!(inner.calls(), 3);
    }
}

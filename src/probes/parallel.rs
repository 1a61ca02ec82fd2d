//! # ParallelProbe: all members must become ready.
//!
//! ```text
//! probe(outer)
//!   │
//!   ├─ shared = outer.child()
//!   ├─ JoinSet::spawn(member_i.probe(shared))   for every member
//!   │
//!   └─ loop (biased select)
//!        ├─ outer.done()         → TimedOut      (shared cancelled, members aborted)
//!        └─ join_next()
//!             ├─ None            → Ok            (every member succeeded)
//!             ├─ Ok(Ok(()))      → keep waiting
//!             ├─ Ok(Err(e))      → MemberFailed  (shared cancelled, members aborted)
//!             └─ Err(panic)      → MemberFailed
//! ```
//!
//! The first failure is returned without waiting for the remaining members.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::{JoinError, JoinSet};

use crate::error::{ComponentError, ProbeError};
use crate::probes::{Probe, ProbeContext};

/// Runs every member concurrently; succeeds when all of them succeed.
pub struct ParallelProbe {
    probes: Vec<Arc<dyn Probe>>,
}

impl ParallelProbe {
    /// Creates a parallel probe. An empty member list succeeds immediately.
    pub fn new(probes: Vec<Arc<dyn Probe>>) -> Self {
        Self { probes }
    }

    /// Adds one more member.
    pub fn with(mut self, probe: impl Probe) -> Self {
        self.probes.push(Arc::new(probe));
        self
    }
}

fn member_failed(source: ProbeError) -> ProbeError {
    ProbeError::MemberFailed {
        source: Box::new(source),
    }
}

fn join_failure(err: JoinError) -> ProbeError {
    if err.is_panic() {
        let payload = err.into_panic();
        ProbeError::fail(ComponentError::from_panic(&*payload).to_string())
    } else {
        ProbeError::Cancelled
    }
}

#[async_trait]
impl Probe for ParallelProbe {
    async fn probe(&self, outer: &ProbeContext) -> Result<(), ProbeError> {
        let shared = outer.child();
        let mut members = JoinSet::new();

        for probe in &self.probes {
            let probe = Arc::clone(probe);
            let ctx = shared.clone();
            members.spawn(async move { probe.probe(&ctx).await });
        }

        let res = loop {
            tokio::select! {
                biased;
                reason = outer.done() => break Err(ProbeError::TimedOut { reason }),
                joined = members.join_next() => match joined {
                    None => break Ok(()),
                    Some(Ok(Ok(()))) => {}
                    Some(Ok(Err(err))) => break Err(member_failed(err)),
                    Some(Err(err)) => break Err(member_failed(join_failure(err))),
                },
            }
        };

        shared.cancel();
        if res.is_err() {
            tracing::debug!(remaining = members.len(), "abandoning parallel probe members");
        }
        res
    }
}

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::probes::ProbeContext;

/// Readiness check: resolves `Ok(())` once the probed dependency is ready.
///
/// Implementations should return promptly when `ctx` ends; the combinators
/// abandon calls that outlive their context.
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    /// Performs one readiness check bounded by `ctx`.
    async fn probe(&self, ctx: &ProbeContext) -> Result<(), ProbeError>;
}

#[async_trait]
impl<P: Probe + ?Sized> Probe for Arc<P> {
    async fn probe(&self, ctx: &ProbeContext) -> Result<(), ProbeError> {
        (**self).probe(ctx).await
    }
}

/// Closure-backed [`Probe`].
///
/// The closure receives an owned copy of the context so the returned future can be `'static`.
///
/// ## Example
/// ```rust
/// use cyclevisor::{ProbeContext, ProbeError, ProbeFn};
///
/// let ready = ProbeFn::new(|_ctx: ProbeContext| async { Ok::<_, ProbeError>(()) });
/// ```
#[derive(Debug, Clone)]
pub struct ProbeFn<F> {
    f: F,
}

impl<F> ProbeFn<F> {
    /// Wraps a closure returning a fresh probe future per call.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Probe for ProbeFn<F>
where
    F: Fn(ProbeContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ProbeError>> + Send + 'static,
{
    async fn probe(&self, ctx: &ProbeContext) -> Result<(), ProbeError> {
        (self.f)(ctx.clone()).await
    }
}

//! # Function-backed capabilities
//!
//! [`SetupFn`], [`StartFn`] and [`CloseFn`] wrap a closure that *creates* a new
//! future per call, so a plain async function can serve as a component capability
//! without a dedicated struct.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use cyclevisor::{Component, ComponentError};
//!
//! let worker = Component::start_fn(|stop: CancellationToken| async move {
//!     stop.cancelled().await;
//!     Ok::<_, ComponentError>(())
//! });
//! assert!(worker.capabilities().start);
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::components::component::{Close, Component, Setup, Start};
use crate::error::ComponentError;

/// Closure-backed [`Setup`].
#[derive(Debug)]
pub struct SetupFn<F> {
    f: F,
}

impl<F> SetupFn<F> {
    /// Wraps a closure returning a fresh setup future per call.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Setup for SetupFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
{
    async fn setup(&self) -> Result<(), ComponentError> {
        (self.f)().await
    }
}

/// Closure-backed [`Start`].
#[derive(Debug)]
pub struct StartFn<F> {
    f: F,
}

impl<F> StartFn<F> {
    /// Wraps a closure returning a fresh run future per call.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Start for StartFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
{
    async fn start(&self, stop: CancellationToken) -> Result<(), ComponentError> {
        (self.f)(stop).await
    }
}

/// Closure-backed [`Close`].
#[derive(Debug)]
pub struct CloseFn<F> {
    f: F,
}

impl<F> CloseFn<F> {
    /// Wraps a closure returning a fresh close future per call.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Close for CloseFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
{
    async fn close(&self) -> Result<(), ComponentError> {
        (self.f)().await
    }
}

impl Component {
    /// Component whose only capability is the given setup closure.
    pub fn setup_fn<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
    {
        Component::new().with_setup(Arc::new(SetupFn::new(f)))
    }

    /// Component whose only capability is the given run closure.
    pub fn start_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
    {
        Component::new().with_start(Arc::new(StartFn::new(f)))
    }

    /// Component whose only capability is the given close closure.
    pub fn close_fn<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
    {
        Component::new().with_close(Arc::new(CloseFn::new(f)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_each_call_creates_a_fresh_future() {
        let calls = Arc::new(AtomicUsize::new(0));
        let setup = {
            let calls = calls.clone();
            SetupFn::new(move || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ComponentError>(())
                }
            })
        };

        setup.setup().await.unwrap();
        setup.setup().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_close_fn_propagates_error() {
        let close = CloseFn::new(|| async { Err::<(), _>(ComponentError::fail("disk full")) });
        assert_eq!(
            close.close().await,
            Err(ComponentError::fail("disk full"))
        );
    }
}

//! # Acceptance-test entry point.
//!
//! [`test_main`] runs a test suite inside a managed lifecycle: fixtures (usually
//! mocks of external services) are set up and started like any other component,
//! a readiness probe gates the suite, and the fixtures are closed afterwards.
//!
//! ```text
//! test_main(suite, manager, probe, fixtures)
//!   │
//!   ├─ add fixtures as "test-fixture-0", "test-fixture-1", ...
//!   ├─ termination source := probe → suite
//!   │     ├─ probe Ok   → suite.run()  → its exit status
//!   │     └─ probe Err  → ProbeFailed event → SIGUSR1
//!   └─ manager.run().signal()
//! ```
//!
//! Setup/close failures of fixtures surface as their usual signal numbers.
//!
//! ## Example
//! ```rust
//! use cyclevisor::{Component, Manager, ManagerConfig, ProbeContext, ProbeError, ProbeFn, SuiteFn, test_main};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let manager = Manager::builder(ManagerConfig::default()).silent().build();
//!     let fixture = Component::setup_fn(|| async { Ok(()) });
//!     let ready = ProbeFn::new(|_ctx: ProbeContext| async { Ok::<_, ProbeError>(()) });
//!
//!     let code = test_main(SuiteFn::new(|| async { 0 }), manager, ready, vec![fixture]).await;
//!     assert_eq!(code, 0);
//! }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::components::Component;
use crate::core::{Manager, SIGUSR1, TerminationSource};
use crate::events::{Event, EventKind};
use crate::probes::{Probe, ProbeContext};
use crate::subscribers::{Subscribe, SubscriberSet};

/// A test suite run once the fixtures are ready.
#[async_trait]
pub trait TestSuite: Send + Sync + 'static {
    /// Runs the tests and returns the process exit status.
    async fn run(&self) -> i32;
}

/// Closure-backed [`TestSuite`].
#[derive(Debug)]
pub struct SuiteFn<F> {
    f: F,
}

impl<F> SuiteFn<F> {
    /// Wraps a closure returning the suite's future.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> TestSuite for SuiteFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = i32> + Send + 'static,
{
    async fn run(&self) -> i32 {
        (self.f)().await
    }
}

/// Termination source that probes, then runs the suite.
struct ProbeGate<S, P> {
    suite: S,
    probe: P,
    subscribers: Vec<Arc<dyn Subscribe>>,
    drain_timeout: Duration,
}

#[async_trait]
impl<S: TestSuite, P: Probe> TerminationSource for ProbeGate<S, P> {
    async fn wait(&self) -> i32 {
        match self.probe.probe(&ProbeContext::background()).await {
            Ok(()) => self.suite.run().await,
            Err(err) => {
                let subs = SubscriberSet::new(self.subscribers.clone())
                    .with_drain_timeout(self.drain_timeout);
                subs.emit(
                    Event::new(EventKind::ProbeFailed)
                        .with_signal(SIGUSR1)
                        .with_reason(err.to_string()),
                );
                subs.shutdown().await;
                SIGUSR1
            }
        }
    }
}

/// Runs `suite` once `probe` reports the `fixtures` ready, and returns the exit status.
///
/// The manager's termination source is replaced; components already registered on
/// `manager` are managed alongside the fixtures.
pub async fn test_main<S, P>(
    suite: S,
    mut manager: Manager,
    probe: P,
    fixtures: Vec<Component>,
) -> i32
where
    S: TestSuite,
    P: Probe,
{
    let gate = ProbeGate {
        suite,
        probe,
        subscribers: manager.subscribers().to_vec(),
        drain_timeout: manager.config().drain_timeout,
    };
    manager.set_termination(Arc::new(gate));

    for (index, fixture) in fixtures.into_iter().enumerate() {
        manager.add(format!("test-fixture-{index}"), fixture);
    }

    manager.run().await.signal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CloseFn, SetupFn, StartFn};
    use crate::core::{ManagerConfig, SIGABRT};
    use crate::error::{ComponentError, ProbeError};
    use crate::probes::{ProbeFn, RetryingProbe};
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    #[derive(Default)]
    struct Calls {
        setup: AtomicUsize,
        start: AtomicUsize,
        close: AtomicUsize,
    }

    fn fixture(calls: &Arc<Calls>) -> Component {
        let (s, r, c) = (calls.clone(), calls.clone(), calls.clone());
        Component::new()
            .with_setup(Arc::new(SetupFn::new(move || {
                s.setup.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, ComponentError>(()) }
            })))
            .with_start(Arc::new(StartFn::new(move |stop: CancellationToken| {
                r.start.fetch_add(1, Ordering::SeqCst);
                async move {
                    stop.cancelled().await;
                    Ok::<_, ComponentError>(())
                }
            })))
            .with_close(Arc::new(CloseFn::new(move || {
                c.close.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, ComponentError>(()) }
            })))
    }

    fn silent_manager() -> Manager {
        Manager::builder(ManagerConfig::default()).silent().build()
    }

    fn counted_suite(runs: &Arc<AtomicUsize>, code: i32) -> impl TestSuite {
        let runs = runs.clone();
        SuiteFn::new(move || {
            runs.fetch_add(1, Ordering::SeqCst);
            async move { code }
        })
    }

    #[tokio::test]
    async fn test_suite_runs_after_fixture_is_ready() {
        let calls = Arc::new(Calls::default());
        let runs = Arc::new(AtomicUsize::new(0));
        let probed = calls.clone();
        let ready = RetryingProbe::new(
            Duration::from_millis(10),
            Duration::from_secs(2),
            ProbeFn::new(move |_ctx: ProbeContext| {
                let started = probed.start.load(Ordering::SeqCst);
                async move {
                    if started == 1 {
                        Ok(())
                    } else {
                        Err(ProbeError::fail("fixture not started"))
                    }
                }
            }),
        );

        let code = test_main(
            counted_suite(&runs, 8),
            silent_manager(),
            ready,
            vec![fixture(&calls)],
        )
        .await;

        assert_eq!(code, 8);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(calls.setup.load(Ordering::SeqCst), 1);
        assert_eq!(calls.start.load(Ordering::SeqCst), 1);
        assert_eq!(calls.close.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_probe_failure_skips_suite() {
        let runs = Arc::new(AtomicUsize::new(0));
        let failing = ProbeFn::new(|_ctx: ProbeContext| async { Err::<(), _>(ProbeError::fail("down")) });

        let code = test_main(counted_suite(&runs, 0), silent_manager(), failing, Vec::new()).await;

        assert_eq!(code, SIGUSR1);
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fixture_setup_failure_wins() {
        let runs = Arc::new(AtomicUsize::new(0));
        let ready = ProbeFn::new(|_ctx: ProbeContext| async { Ok::<_, ProbeError>(()) });
        let broken = Component::setup_fn(|| async { Err(ComponentError::fail("no port")) });

        let code = test_main(counted_suite(&runs, 0), silent_manager(), ready, vec![broken]).await;

        assert_eq!(code, SIGABRT);
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fixtures_are_named_by_index() {
        struct Names(StdMutex<Vec<String>>);

        #[async_trait]
        impl Subscribe for Names {
            async fn on_event(&self, event: &Event) {
                if event.kind == EventKind::SetupStarting {
                    if let Some(c) = &event.component {
                        self.0.lock().unwrap().push(c.to_string());
                    }
                }
            }
        }

        let names = Arc::new(Names(StdMutex::new(Vec::new())));
        let manager = Manager::builder(ManagerConfig::default())
            .with_subscribers(vec![names.clone()])
            .build();
        let ready = ProbeFn::new(|_ctx: ProbeContext| async { Ok::<_, ProbeError>(()) });
        let fixtures = vec![
            Component::setup_fn(|| async { Ok(()) }),
            Component::setup_fn(|| async { Ok(()) }),
        ];

        let code = test_main(SuiteFn::new(|| async { 0 }), manager, ready, fixtures).await;

        assert_eq!(code, 0);
        assert_eq!(
            *names.0.lock().unwrap(),
            vec!["test-fixture-0".to_string(), "test-fixture-1".to_string()]
        );
    }
}

//! # Manager: phased lifecycle of registered components.
//!
//! The [`Manager`] owns the ordered registration list, the [`ManagerConfig`], the
//! termination source and the diagnostic sinks. A single call to [`Manager::run`]
//! drives four phases and returns the one [`Termination`] cause that ended the run.
//!
//! ## Phases
//! ```text
//! run(self)
//!   │
//!   ├─► 1. setup   (sequential, registration order)
//!   │       for each component with Setup:
//!   │         race_with_timeout(setup(), cfg.setup_timeout)
//!   │           ├─ Ok       → next
//!   │           ├─ Timeout  → return SetupTimedOut   (no start, no close)
//!   │           └─ Err      → return SetupFailed     (no start, no close)
//!   │
//!   ├─► 2. start   (concurrent, detached)
//!   │       for each component with Start:
//!   │         tokio::spawn(start(stop_token)) with catch_unwind
//!   │           ├─ Ok       → ComponentStopped event, no cause
//!   │           └─ Err/panic→ arbiter.offer(StartFailed)
//!   │
//!   ├─► 3. wait
//!   │       tokio::spawn(termination.wait()) → arbiter.offer(Signal(v))
//!   │       cause = arbiter.recv()            (first offer wins)
//!   │       stop_token.cancel()               (runners asked to stop)
//!   │
//!   └─► 4. close   (sequential, reverse registration order)
//!           for each component with Close:
//!             race_with_timeout(close(), cfg.close_timeout)
//!               ├─ Ok       → next
//!               ├─ Timeout  → return CloseTimedOut   (overrides cause)
//!               └─ Err      → return CloseFailed     (overrides cause)
//!           return cause
//! ```
//!
//! ## Rules
//! - Setup strictly precedes start; start tasks are spawned before the wait begins
//!   but may still be running during it.
//! - Runners are never aborted. A runner that ignores its stop token outlives the run;
//!   process exit is the only backstop.
//! - A timed-out setup/close call is detached and may keep running.
//! - Diagnostics are best-effort and drained before `run` returns, for at most
//!   `cfg.drain_timeout`.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use cyclevisor::{Component, ComponentError, Manager, ManagerConfig, Termination};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut manager = Manager::builder(ManagerConfig::default())
//!         .silent()
//!         .with_termination_fn(|| async { 0 })
//!         .build();
//!
//!     manager
//!         .add("config", Component::setup_fn(|| async { Ok(()) }))
//!         .add("worker", Component::start_fn(|stop: CancellationToken| async move {
//!             stop.cancelled().await;
//!             Ok::<_, ComponentError>(())
//!         }));
//!
//!     assert_eq!(manager.run().await, Termination::Signal(0));
//! }
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::components::{Component, NamedComponent};
use crate::core::{
    arbiter::{self, CauseSender},
    builder::ManagerBuilder,
    config::ManagerConfig,
    race::race_with_timeout,
    termination::{SIGABRT, Termination, TerminationSource},
};
use crate::error::ComponentError;
use crate::events::{Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Drives setup → start → wait → close over an ordered set of components.
///
/// A manager runs exactly once: [`run`](Self::run) takes it by value.
pub struct Manager {
    cfg: ManagerConfig,
    components: Vec<NamedComponent>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    termination: Arc<dyn TerminationSource>,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    /// Creates a manager with the default configuration: 5s timeouts, a
    /// [`LogWriter`](crate::LogWriter) sink and [`InterruptSignal`](crate::InterruptSignal).
    pub fn new() -> Self {
        ManagerBuilder::new(ManagerConfig::default()).build()
    }

    /// Returns a builder for a manager with custom collaborators.
    pub fn builder(cfg: ManagerConfig) -> ManagerBuilder {
        ManagerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: ManagerConfig,
        subscribers: Vec<Arc<dyn Subscribe>>,
        termination: Arc<dyn TerminationSource>,
    ) -> Self {
        Self {
            cfg,
            components: Vec::new(),
            subscribers,
            termination,
        }
    }

    /// Appends a component; registration order is setup/start order and reversed close order.
    ///
    /// Names are for diagnostics only and may repeat.
    pub fn add(&mut self, name: impl Into<Arc<str>>, component: Component) -> &mut Self {
        self.components.push(NamedComponent::new(name, component));
        self
    }

    /// Registered components, in registration order.
    pub fn components(&self) -> &[NamedComponent] {
        &self.components
    }

    /// The manager's configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.cfg
    }

    pub(crate) fn set_termination(&mut self, termination: Arc<dyn TerminationSource>) {
        self.termination = termination;
    }

    pub(crate) fn subscribers(&self) -> &[Arc<dyn Subscribe>] {
        &self.subscribers
    }

    /// Runs all phases and returns the cause that ended the run.
    ///
    /// Must be called from within a tokio runtime. The manager is consumed, so a
    /// second run does not compile:
    ///
    /// ```compile_fail
    /// # async fn twice() {
    /// let manager = cyclevisor::Manager::new();
    /// let _ = manager.run().await;
    /// let _ = manager.run().await;
    /// # }
    /// ```
    pub async fn run(self) -> Termination {
        let subs = Arc::new(
            SubscriberSet::new(self.subscribers.clone()).with_drain_timeout(self.cfg.drain_timeout),
        );

        let cause = self.drive(&subs).await;

        subs.emit(
            Event::new(EventKind::RunFinished)
                .with_signal(cause.signal())
                .with_reason(cause.as_label()),
        );
        subs.shutdown().await;
        cause
    }

    async fn drive(&self, subs: &Arc<SubscriberSet>) -> Termination {
        if let Err(cause) = self.setup_components(subs).await {
            return cause;
        }

        let stop = CancellationToken::new();
        let (offer, receiver) = arbiter::channel();

        self.start_components(subs, &stop, &offer);
        self.spawn_termination_waiter(subs, offer);

        let cause = receiver.recv().await;
        subs.emit(
            Event::new(EventKind::TerminationReceived)
                .with_signal(cause.signal())
                .with_reason(cause.as_label()),
        );
        stop.cancel();

        match self.close_components(subs).await {
            Ok(()) => cause,
            Err(close_cause) => close_cause,
        }
    }

    /// Sets up components in registration order; the first failure or timeout aborts.
    async fn setup_components(&self, subs: &Arc<SubscriberSet>) -> Result<(), Termination> {
        let timeout = self.cfg.setup_timeout;

        for nc in &self.components {
            let Some(setup) = nc.component.setup_ref() else {
                continue;
            };
            subs.emit(Event::new(EventKind::SetupStarting).with_component(nc.name.clone()));

            let setup = Arc::clone(setup);
            match race_with_timeout(&nc.name, async move { setup.setup().await }, timeout).await {
                Ok(()) => {}
                Err(ComponentError::Timeout { timeout }) => {
                    subs.emit(
                        Event::new(EventKind::SetupTimedOut)
                            .with_component(nc.name.clone())
                            .with_timeout(timeout),
                    );
                    return Err(Termination::SetupTimedOut {
                        component: nc.name.clone(),
                        timeout,
                    });
                }
                Err(error) => {
                    subs.emit(
                        Event::new(EventKind::SetupFailed)
                            .with_component(nc.name.clone())
                            .with_reason(error.to_string()),
                    );
                    return Err(Termination::SetupFailed {
                        component: nc.name.clone(),
                        error,
                    });
                }
            }
        }
        Ok(())
    }

    /// Spawns every runner as a detached task; failures are offered to the arbiter.
    fn start_components(
        &self,
        subs: &Arc<SubscriberSet>,
        stop: &CancellationToken,
        offer: &CauseSender,
    ) {
        for nc in &self.components {
            let Some(start) = nc.component.start_ref() else {
                continue;
            };
            subs.emit(Event::new(EventKind::ComponentStarting).with_component(nc.name.clone()));

            let start = Arc::clone(start);
            let name = nc.name.clone();
            let stop = stop.clone();
            let offer = offer.clone();
            let subs = Arc::clone(subs);
            let terminates = self.cfg.start_failure_terminates;

            tokio::spawn(async move {
                let res = std::panic::AssertUnwindSafe(start.start(stop))
                    .catch_unwind()
                    .await;

                let error = match res {
                    Ok(Ok(())) => {
                        subs.emit(Event::new(EventKind::ComponentStopped).with_component(name));
                        return;
                    }
                    Ok(Err(error)) => {
                        subs.emit(
                            Event::new(EventKind::StartFailed)
                                .with_component(name.clone())
                                .with_reason(error.to_string()),
                        );
                        error
                    }
                    Err(panic_err) => {
                        let error = ComponentError::from_panic(&*panic_err);
                        subs.emit(
                            Event::new(EventKind::StartPanicked)
                                .with_component(name.clone())
                                .with_reason(error.to_string()),
                        );
                        error
                    }
                };

                if terminates {
                    offer.offer(
                        Termination::StartFailed {
                            component: name,
                            error,
                        },
                        &subs,
                    );
                }
            });
        }
    }

    /// Spawns the task that waits for the termination source and offers its value.
    fn spawn_termination_waiter(&self, subs: &Arc<SubscriberSet>, offer: CauseSender) {
        let source = Arc::clone(&self.termination);
        let subs = Arc::clone(subs);

        tokio::spawn(async move {
            let signal = match std::panic::AssertUnwindSafe(source.wait())
                .catch_unwind()
                .await
            {
                Ok(signal) => signal,
                Err(panic_err) => {
                    let error = ComponentError::from_panic(&*panic_err);
                    tracing::error!(error = %error, "termination source panicked");
                    SIGABRT
                }
            };
            offer.offer(Termination::Signal(signal), &subs);
        });
    }

    /// Closes components in reverse registration order; the first failure or timeout aborts.
    async fn close_components(&self, subs: &Arc<SubscriberSet>) -> Result<(), Termination> {
        let timeout = self.cfg.close_timeout;

        for nc in self.components.iter().rev() {
            let Some(close) = nc.component.close_ref() else {
                continue;
            };
            subs.emit(Event::new(EventKind::CloseStarting).with_component(nc.name.clone()));

            let close = Arc::clone(close);
            match race_with_timeout(&nc.name, async move { close.close().await }, timeout).await {
                Ok(()) => {}
                Err(ComponentError::Timeout { timeout }) => {
                    subs.emit(
                        Event::new(EventKind::CloseTimedOut)
                            .with_component(nc.name.clone())
                            .with_timeout(timeout),
                    );
                    return Err(Termination::CloseTimedOut {
                        component: nc.name.clone(),
                        timeout,
                    });
                }
                Err(error) => {
                    subs.emit(
                        Event::new(EventKind::CloseFailed)
                            .with_component(nc.name.clone())
                            .with_reason(error.to_string()),
                    );
                    return Err(Termination::CloseFailed {
                        component: nc.name.clone(),
                        error,
                    });
                }
            }
        }
        Ok(())
    }
}

use std::future::Future;
use std::sync::Arc;

use crate::core::{
    config::ManagerConfig,
    manager::Manager,
    shutdown::InterruptSignal,
    termination::{TerminationFn, TerminationSource},
};
use crate::subscribers::{LogWriter, Subscribe};

/// Builder for constructing a [`Manager`] with non-default collaborators.
///
/// Defaults: one [`LogWriter`] subscriber and [`InterruptSignal`] as termination source.
pub struct ManagerBuilder {
    cfg: ManagerConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    termination: Arc<dyn TerminationSource>,
}

impl ManagerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: ManagerConfig) -> Self {
        Self {
            cfg,
            subscribers: vec![Arc::new(LogWriter::new())],
            termination: Arc::new(InterruptSignal),
        }
    }

    /// Replaces the diagnostic sinks.
    ///
    /// Subscribers receive lifecycle events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Removes every diagnostic sink; the manager logs nothing.
    pub fn silent(mut self) -> Self {
        self.subscribers.clear();
        self
    }

    /// Replaces the termination source the wait phase blocks on.
    pub fn with_termination(mut self, termination: Arc<dyn TerminationSource>) -> Self {
        self.termination = termination;
        self
    }

    /// Shorthand for [`with_termination`](Self::with_termination) with a [`TerminationFn`].
    pub fn with_termination_fn<F, Fut>(self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = i32> + Send + 'static,
    {
        self.with_termination(Arc::new(TerminationFn::new(f)))
    }

    /// Builds the manager with an empty registration list.
    pub fn build(self) -> Manager {
        Manager::new_internal(self.cfg, self.subscribers, self.termination)
    }
}

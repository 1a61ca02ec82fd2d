//! # Capability traits and the component record.
//!
//! A component exposes any subset of three capabilities:
//! - [`Setup`]: initialize once, before anything is started;
//! - [`Start`]: long-lived work, expected to run until asked to stop;
//! - [`Close`]: release resources, called in reverse registration order.
//!
//! Which capabilities a component has is decided when the [`Component`] value is
//! assembled and never re-queried afterwards.
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use cyclevisor::{Close, Component, ComponentError, Setup, Start};
//!
//! struct Database;
//!
//! #[async_trait]
//! impl Setup for Database {
//!     async fn setup(&self) -> Result<(), ComponentError> { Ok(()) }
//! }
//!
//! #[async_trait]
//! impl Start for Database {
//!     async fn start(&self, stop: CancellationToken) -> Result<(), ComponentError> {
//!         stop.cancelled().await;
//!         Ok(())
//!     }
//! }
//!
//! #[async_trait]
//! impl Close for Database {
//!     async fn close(&self) -> Result<(), ComponentError> { Ok(()) }
//! }
//!
//! let db = Component::full(Arc::new(Database));
//! assert!(db.capabilities().setup && db.capabilities().start && db.capabilities().close);
//!
//! let setup_only = Component::new().with_setup(Arc::new(Database));
//! assert!(!setup_only.capabilities().start);
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ComponentError;

/// Initialize-once capability.
///
/// Called sequentially in registration order, raced against the setup timeout.
#[async_trait]
pub trait Setup: Send + Sync + 'static {
    /// Prepares the component. An error aborts the whole run.
    async fn setup(&self) -> Result<(), ComponentError>;
}

/// Run-until-stopped capability.
///
/// Every runner is spawned on its own task once all setups succeeded. The manager
/// never aborts a runner: `stop` is cancelled when the run is about to close, and
/// exiting promptly is the component's own responsibility.
#[async_trait]
pub trait Start: Send + Sync + 'static {
    /// Runs the component's long-lived work.
    ///
    /// Returning `Ok(())` produces no termination cause. Returning an error (or
    /// panicking) ends the run unless another cause was recorded first.
    async fn start(&self, stop: CancellationToken) -> Result<(), ComponentError>;
}

/// Release-resources capability.
///
/// Called sequentially in reverse registration order, raced against the close timeout.
#[async_trait]
pub trait Close: Send + Sync + 'static {
    /// Releases the component's resources. An error aborts the close phase.
    async fn close(&self) -> Result<(), ComponentError>;
}

/// Capability flags of a [`Component`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Component implements [`Setup`].
    pub setup: bool,
    /// Component implements [`Start`].
    pub start: bool,
    /// Component implements [`Close`].
    pub close: bool,
}

/// Capability record: up to one implementation of each capability.
///
/// A component with no capability at all is legal and simply inert.
#[derive(Clone, Default)]
pub struct Component {
    setup: Option<Arc<dyn Setup>>,
    start: Option<Arc<dyn Start>>,
    close: Option<Arc<dyn Close>>,
}

impl Component {
    /// Creates an inert component with no capability.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a value implementing all three capabilities.
    pub fn full<T>(inner: Arc<T>) -> Self
    where
        T: Setup + Start + Close,
    {
        Self {
            setup: Some(inner.clone()),
            start: Some(inner.clone()),
            close: Some(inner),
        }
    }

    /// Sets the [`Setup`] capability.
    pub fn with_setup(mut self, setup: Arc<dyn Setup>) -> Self {
        self.setup = Some(setup);
        self
    }

    /// Sets the [`Start`] capability.
    pub fn with_start(mut self, start: Arc<dyn Start>) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the [`Close`] capability.
    pub fn with_close(mut self, close: Arc<dyn Close>) -> Self {
        self.close = Some(close);
        self
    }

    /// Returns which capabilities this component exposes.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            setup: self.setup.is_some(),
            start: self.start.is_some(),
            close: self.close.is_some(),
        }
    }

    pub(crate) fn setup_ref(&self) -> Option<&Arc<dyn Setup>> {
        self.setup.as_ref()
    }

    pub(crate) fn start_ref(&self) -> Option<&Arc<dyn Start>> {
        self.start.as_ref()
    }

    pub(crate) fn close_ref(&self) -> Option<&Arc<dyn Close>> {
        self.close.as_ref()
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

/// A component together with the name used in diagnostics.
///
/// Names are not required to be unique.
#[derive(Clone, Debug)]
pub struct NamedComponent {
    /// Human-readable identity.
    pub name: Arc<str>,
    /// The wrapped capability record.
    pub component: Component,
}

impl NamedComponent {
    /// Creates a named component.
    pub fn new(name: impl Into<Arc<str>>, component: Component) -> Self {
        Self {
            name: name.into(),
            component,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl Setup for Noop {
        async fn setup(&self) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    #[async_trait]
    impl Close for Noop {
        async fn close(&self) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    #[test]
    fn test_inert_component_has_no_capability() {
        assert_eq!(Component::new().capabilities(), Capabilities::default());
    }

    #[test]
    fn test_capabilities_follow_assembly() {
        let noop = Arc::new(Noop);
        let c = Component::new().with_setup(noop.clone()).with_close(noop);
        assert_eq!(
            c.capabilities(),
            Capabilities {
                setup: true,
                start: false,
                close: true,
            }
        );
        assert!(c.start_ref().is_none());
    }
}

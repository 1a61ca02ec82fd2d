//! # Components and their capabilities.
//!
//! This module provides the component-related types:
//! - [`Setup`], [`Start`], [`Close`] - the three capability traits
//! - [`Component`] - capability record assembled once at registration time
//! - [`NamedComponent`] - a component plus its diagnostic name
//! - [`SetupFn`], [`StartFn`], [`CloseFn`] - closure-backed capabilities

mod component;
mod component_fn;

pub use component::{Capabilities, Close, Component, NamedComponent, Setup, Start};
pub use component_fn::{CloseFn, SetupFn, StartFn};

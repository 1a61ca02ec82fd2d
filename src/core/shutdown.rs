//! # Cross-platform OS signal handling.
//!
//! Provides [`InterruptSignal`], the default [`TerminationSource`]: it completes when
//! the process receives a termination signal and reports `0` (clean shutdown).
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//!
//! `SIGQUIT` is left alone and keeps its default core-dump behaviour.
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use async_trait::async_trait;

use crate::core::termination::{SIGABRT, TerminationSource};

/// Waits for SIGINT/SIGTERM (or Ctrl-C) and reports `0`.
///
/// If the signal handlers cannot be registered the failure is logged and
/// `SIGABRT` is reported instead, so the run still closes its components.
#[derive(Debug, Default, Clone, Copy)]
pub struct InterruptSignal;

#[async_trait]
impl TerminationSource for InterruptSignal {
    async fn wait(&self) -> i32 {
        match wait_for_shutdown_signal().await {
            Ok(()) => 0,
            Err(e) => {
                tracing::error!(error = %e, "failed to register OS signal handlers");
                SIGABRT
            }
        }
    }
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Returns `Ok(())` when Ctrl-C is received, or `Err` if signal registration fails.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

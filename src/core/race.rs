//! # Timeout racing for setup and close calls.
//!
//! [`race_with_timeout`] runs one capability call on its own task and waits for it
//! at most `timeout`.
//!
//! ## Rules
//! - Operation finishes first → its result is returned verbatim
//! - Operation panics → [`ComponentError::Panicked`]
//! - Timer fires first → [`ComponentError::Timeout`]; the operation's task is
//!   **detached, not aborted**, and may keep running in the background
//! - No retry
//!
//! ```text
//! race_with_timeout(name, op, d)
//!   ├─► tokio::spawn(op) ──────────────┐
//!   └─► time::timeout(d, join handle) ─┴─► Ok(res) | Panicked | Timeout
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time;

use crate::error::ComponentError;

/// Runs `op` on a separate task, returning its result or a timeout error.
///
/// `name` identifies the component in diagnostics. A timed-out task is left running.
pub(crate) async fn race_with_timeout<F>(
    name: &str,
    op: F,
    timeout: Duration,
) -> Result<(), ComponentError>
where
    F: Future<Output = Result<(), ComponentError>> + Send + 'static,
{
    let handle = tokio::spawn(op);

    match time::timeout(timeout, handle).await {
        Ok(Ok(res)) => res,
        Ok(Err(join_err)) if join_err.is_panic() => {
            Err(ComponentError::from_panic(&*join_err.into_panic()))
        }
        Ok(Err(join_err)) => Err(ComponentError::Fail {
            error: join_err.to_string(),
        }),
        Err(_elapsed) => {
            tracing::debug!(component = name, ?timeout, "call timed out; detaching its task");
            Err(ComponentError::Timeout { timeout })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_result_is_returned_verbatim() {
        assert_eq!(
            race_with_timeout("c", async { Ok(()) }, Duration::from_millis(100)).await,
            Ok(())
        );
        assert_eq!(
            race_with_timeout(
                "c",
                async { Err(ComponentError::fail("nope")) },
                Duration::from_millis(100)
            )
            .await,
            Err(ComponentError::fail("nope"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_does_not_abort_operation() {
        let finished = Arc::new(AtomicBool::new(false));
        let op = {
            let finished = finished.clone();
            async move {
                time::sleep(Duration::from_millis(200)).await;
                finished.store(true, Ordering::SeqCst);
                Ok::<_, ComponentError>(())
            }
        };

        let res = race_with_timeout("slow", op, Duration::from_millis(100)).await;
        assert_eq!(
            res,
            Err(ComponentError::Timeout {
                timeout: Duration::from_millis(100)
            })
        );
        assert!(!finished.load(Ordering::SeqCst));

        time::sleep(Duration::from_millis(150)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    async fn explode() -> Result<(), ComponentError> {
        panic!("setup exploded")
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let res = race_with_timeout("boom", explode(), Duration::from_secs(1)).await;
        assert_eq!(
            res,
            Err(ComponentError::Panicked {
                info: "setup exploded".into()
            })
        );
    }
}

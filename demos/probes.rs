//! # Example: Readiness-gated Test Suite
//!
//! A mock service fixture becomes ready 300ms after it starts. The harness waits
//! for it with a retrying probe, runs the "suite", closes the fixture and exits
//! with the suite's status.
//!
//! ```text
//! RUST_LOG=debug cargo run --example probes
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use cyclevisor::{
    Component, ComponentError, Manager, ManagerConfig, ParallelProbe, ProbeContext, ProbeError,
    ProbeFn, RetryingProbe, SuiteFn, test_main,
};

fn mock_service(ready: Arc<AtomicBool>) -> Component {
    Component::start_fn(move |stop: CancellationToken| {
        let ready = ready.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            ready.store(true, Ordering::SeqCst);
            tracing::info!("mock service ready");
            stop.cancelled().await;
            Ok::<_, ComponentError>(())
        }
    })
}

fn readiness(name: &'static str, ready: Arc<AtomicBool>) -> RetryingProbe {
    RetryingProbe::new(
        Duration::from_millis(50),
        Duration::from_secs(2),
        ProbeFn::new(move |_ctx: ProbeContext| {
            let up = ready.load(Ordering::SeqCst);
            async move {
                if up {
                    Ok(())
                } else {
                    Err(ProbeError::fail(format!("{name} not ready")))
                }
            }
        }),
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let users = Arc::new(AtomicBool::new(false));
    let billing = Arc::new(AtomicBool::new(false));

    let probe = ParallelProbe::new(Vec::new())
        .with(readiness("users", users.clone()))
        .with(readiness("billing", billing.clone()));

    let suite = SuiteFn::new(|| async {
        println!("running acceptance tests against mock services");
        0
    });

    let manager = Manager::builder(ManagerConfig::default()).build();
    let code = test_main(
        suite,
        manager,
        probe,
        vec![mock_service(users), mock_service(billing)],
    )
    .await;

    println!("suite exited with {code}");
    std::process::exit(code);
}

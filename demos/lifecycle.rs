//! # Example: Service Lifecycle
//!
//! Three components: a database pool (setup/close), an HTTP-like worker (start)
//! and a cache (setup/start/close). The run ends on Ctrl-C or after 3 seconds,
//! whichever comes first, and the process exits with the termination's signal number.
//!
//! ```text
//! RUST_LOG=info cargo run --example lifecycle
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use cyclevisor::{
    Close, Component, ComponentError, InterruptSignal, Manager, ManagerConfig, Setup, Start,
    TerminationSource,
};

/// Cache with all three capabilities.
#[derive(Default)]
struct Cache {
    hits: AtomicU64,
}

#[async_trait]
impl Setup for Cache {
    async fn setup(&self) -> Result<(), ComponentError> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        tracing::info!("cache warmed");
        Ok(())
    }
}

#[async_trait]
impl Start for Cache {
    async fn start(&self, stop: CancellationToken) -> Result<(), ComponentError> {
        let mut tick = tokio::time::interval(Duration::from_millis(500));
        loop {
            tokio::select! {
                _ = stop.cancelled() => return Ok(()),
                _ = tick.tick() => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }
}

#[async_trait]
impl Close for Cache {
    async fn close(&self) -> Result<(), ComponentError> {
        tracing::info!(hits = self.hits.load(Ordering::Relaxed), "cache flushed");
        Ok(())
    }
}

fn database() -> Component {
    Component::setup_fn(|| async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        tracing::info!("database pool ready");
        Ok(())
    })
    .with_close(Arc::new(cyclevisor::CloseFn::new(|| async {
        tracing::info!("database pool drained");
        Ok(())
    })))
}

fn http() -> Component {
    Component::start_fn(|stop: CancellationToken| async move {
        tracing::info!("listening on 127.0.0.1:8080");
        stop.cancelled().await;
        tracing::info!("listener stopped");
        Ok::<_, ComponentError>(())
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = ManagerConfig {
        setup_timeout: Duration::from_secs(2),
        close_timeout: Duration::from_secs(2),
        ..ManagerConfig::default()
    };

    let mut manager = Manager::builder(cfg)
        .with_termination_fn(|| async {
            tokio::select! {
                code = InterruptSignal.wait() => code,
                _ = tokio::time::sleep(Duration::from_secs(3)) => 0,
            }
        })
        .build();

    manager
        .add("database", database())
        .add("cache", Component::full(Arc::new(Cache::default())))
        .add("http", http());

    let cause = manager.run().await;
    println!("run finished: {cause} (exit code {})", cause.signal());

    if cause.signal() != 0 {
        std::process::exit(cause.signal());
    }
    Ok(())
}

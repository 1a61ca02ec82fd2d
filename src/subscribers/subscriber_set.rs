//! # Non-blocking event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`], which distributes events to multiple subscribers
//! concurrently without blocking the publisher.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → tracing::error!
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     │    (bounded)
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//!          (bounded)
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process event N while B processes N+5
//! - **Overflow**: event dropped for that subscriber only, reported with `tracing::warn!`
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Isolation**: slow/panicking subscriber doesn't affect others
//! - **Per-subscriber FIFO**: each subscriber sees events in order
//! - **Drain on shutdown**: [`SubscriberSet::shutdown`] closes every queue and waits
//!   until the already-queued events are processed, for at most the drain timeout;
//!   workers still busy after that are aborted
//!
//! ## Panic handling
//! Worker tasks use `catch_unwind` to isolate panics; the worker continues with the
//! next event. `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber panics while holding a lock.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;

use crate::error::ComponentError;
use crate::events::Event;
use crate::subscribers::Subscribe;

/// Default upper bound for [`SubscriberSet::shutdown`].
pub(crate) const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for multiple event subscribers.
///
/// Shared as `Arc<SubscriberSet>` between the manager and the runner tasks it spawns.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    closing: CancellationToken,
    drain_timeout: Duration,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let closing = CancellationToken::new();
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, rx) = mpsc::channel::<Arc<Event>>(cap);

            workers.push(tokio::spawn(worker(sub, rx, closing.clone())));
            channels.push(SubscriberChannel { name, sender: tx });
        }
        Self {
            channels,
            workers: Mutex::new(workers),
            closing,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    /// Sets how long [`shutdown`](Self::shutdown) waits for queued events (default 1s).
    #[must_use]
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Creates a set without subscribers; every emit is a no-op.
    #[must_use]
    pub fn silent() -> Self {
        Self::new(Vec::new())
    }

    /// Returns `true` when no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Emits an event to all subscribers.
    ///
    /// - Uses `try_send` (non-blocking)
    /// - On queue full: drops the event for that subscriber and warns
    /// - On queue closed (after [`shutdown`](Self::shutdown)): drops silently
    pub fn emit(&self, event: Event) {
        if self.channels.is_empty() {
            return;
        }
        let event = Arc::new(event);

        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(ev)) => {
                    tracing::warn!(
                        subscriber = channel.name,
                        kind = ?ev.kind,
                        seq = ev.seq,
                        "subscriber queue full; event dropped"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
    }

    /// Closes every queue and waits for the workers to drain what was already queued.
    ///
    /// Waits at most the drain timeout; workers still running after it are aborted and
    /// their undelivered events are lost. Later [`emit`](Self::emit) calls (e.g. from
    /// runners still alive in the background) are ignored.
    pub async fn shutdown(&self) {
        self.closing.cancel();

        let mut workers = std::mem::take(&mut *self.workers.lock().await);
        let drained = time::timeout(self.drain_timeout, async {
            for h in workers.iter_mut() {
                let _ = h.await;
            }
        })
        .await;

        if drained.is_err() {
            let stuck = workers.iter().filter(|h| !h.is_finished()).count();
            for h in &workers {
                h.abort();
            }
            tracing::warn!(
                stuck,
                timeout = ?self.drain_timeout,
                "subscribers did not drain in time; workers aborted"
            );
        }
    }
}

/// Delivers queued events to one subscriber until the set is closed and drained.
async fn worker(
    sub: Arc<dyn Subscribe>,
    mut rx: mpsc::Receiver<Arc<Event>>,
    closing: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            ev = rx.recv() => match ev {
                Some(ev) => deliver(sub.as_ref(), &ev).await,
                None => return,
            },
            _ = closing.cancelled() => {
                rx.close();
                while let Some(ev) = rx.recv().await {
                    deliver(sub.as_ref(), &ev).await;
                }
                return;
            }
        }
    }
}

async fn deliver(sub: &dyn Subscribe, ev: &Event) {
    let fut = sub.on_event(ev);
    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
        let info = ComponentError::from_panic(&*panic_err);
        tracing::error!(
            subscriber = sub.name(),
            kind = ?ev.kind,
            error = %info,
            "subscriber panicked while handling event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct Recorder {
        seen: StdMutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Panicky;

    #[async_trait]
    impl Subscribe for Panicky {
        async fn on_event(&self, _event: &Event) {
            panic!("subscriber bug");
        }
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_events() {
        let rec = Arc::new(Recorder::default());
        let set = SubscriberSet::new(vec![rec.clone()]);

        set.emit(Event::new(EventKind::SetupStarting));
        set.emit(Event::new(EventKind::ComponentStarting));
        set.emit(Event::new(EventKind::RunFinished));
        set.shutdown().await;

        assert_eq!(
            *rec.seen.lock().unwrap(),
            vec![
                EventKind::SetupStarting,
                EventKind::ComponentStarting,
                EventKind::RunFinished
            ]
        );
    }

    #[tokio::test]
    async fn test_panicking_subscriber_does_not_affect_others() {
        let rec = Arc::new(Recorder::default());
        let set = SubscriberSet::new(vec![Arc::new(Panicky), rec.clone()]);

        set.emit(Event::new(EventKind::CloseStarting));
        set.emit(Event::new(EventKind::CloseFailed));
        set.shutdown().await;

        assert_eq!(rec.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_emit_after_shutdown_is_ignored() {
        let rec = Arc::new(Recorder::default());
        let set = SubscriberSet::new(vec![rec.clone()]);
        set.shutdown().await;

        set.emit(Event::new(EventKind::StartFailed));
        assert!(rec.seen.lock().unwrap().is_empty());
    }

    struct Stuck;

    #[async_trait]
    impl Subscribe for Stuck {
        async fn on_event(&self, _event: &Event) {
            std::future::pending::<()>().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_gives_up_on_stuck_subscriber() {
        let rec = Arc::new(Recorder::default());
        let set = SubscriberSet::new(vec![Arc::new(Stuck), rec.clone()])
            .with_drain_timeout(Duration::from_millis(200));

        set.emit(Event::new(EventKind::SetupStarting));
        let started = time::Instant::now();
        set.shutdown().await;

        assert!(started.elapsed() <= Duration::from_millis(250));
        assert_eq!(*rec.seen.lock().unwrap(), vec![EventKind::SetupStarting]);
    }

    #[tokio::test]
    async fn test_silent_set() {
        let set = SubscriberSet::silent();
        assert!(set.is_empty());
        set.emit(Event::new(EventKind::SetupStarting));
        set.shutdown().await;
    }
}

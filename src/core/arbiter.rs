//! # Single-slot termination arbitration.
//!
//! Runner tasks and the termination task race to decide why a run ends. The
//! arbiter is a shared `decided` flag in front of a capacity-one `mpsc` channel:
//!
//! ```text
//! runner A ──┐ offer(StartFailed)  ──► [slot: 1] ──► CauseReceiver::recv() ──► winning cause
//! runner B ──┤ offer(StartFailed)  ──► decided → dropped (CauseDropped event)
//! source   ──┘ offer(Signal(v))    ──► decided → dropped (CauseDropped event)
//! ```
//!
//! ## Rules
//! - **First writer wins**: the first offer to flip `decided` fills the slot; every
//!   later offer is dropped, whether or not the winner was already received
//! - **Non-blocking**: offering never waits
//! - **Exactly once**: [`CauseReceiver::recv`] consumes the receiver and closes the
//!   channel right after the first value

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use crate::core::termination::Termination;
use crate::events::{Event, EventKind};
use crate::subscribers::SubscriberSet;

/// Creates a connected offer/receive pair.
pub(crate) fn channel() -> (CauseSender, CauseReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (
        CauseSender {
            tx: tx.clone(),
            decided: Arc::new(AtomicBool::new(false)),
        },
        CauseReceiver { rx, _keepalive: tx },
    )
}

/// Writer side; cheap to clone into every runner task.
#[derive(Clone)]
pub(crate) struct CauseSender {
    tx: mpsc::Sender<Termination>,
    decided: Arc<AtomicBool>,
}

impl CauseSender {
    /// Offers a cause without blocking.
    ///
    /// Returns `true` if this cause won the slot. A losing cause is reported as
    /// [`EventKind::CauseDropped`] and otherwise ignored.
    pub(crate) fn offer(&self, cause: Termination, subs: &Arc<SubscriberSet>) -> bool {
        let cause = if self.decided.swap(true, Ordering::AcqRel) {
            cause
        } else {
            // Only the winner gets here, so the slot is empty unless the receiver is gone.
            match self.tx.try_send(cause) {
                Ok(()) => return true,
                Err(e) => e.into_inner(),
            }
        };
        subs.emit(
            Event::new(EventKind::CauseDropped)
                .with_signal(cause.signal())
                .with_reason(cause.as_label()),
        );
        false
    }
}

/// Reader side; owned by the wait phase.
pub(crate) struct CauseReceiver {
    rx: mpsc::Receiver<Termination>,
    // Keeps `recv` from observing a closed channel while every writer task is gone.
    _keepalive: mpsc::Sender<Termination>,
}

impl CauseReceiver {
    /// Waits for the first offered cause and closes the slot.
    pub(crate) async fn recv(mut self) -> Termination {
        let cause = match self.rx.recv().await {
            Some(cause) => cause,
            None => std::future::pending().await,
        };
        self.rx.close();
        cause
    }
}

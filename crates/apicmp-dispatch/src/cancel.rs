//! Cooperative cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Shared cancellation flag with a wake-up signal
///
/// The flag only ever goes from false to true. Clones share the same state,
/// so a clone handed to a signal handler cancels every request the
/// dispatcher has in flight.
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    signal: broadcast::Sender<()>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (signal, _) = broadcast::channel(1);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                signal,
            }),
        }
    }

    /// Request cancellation; later calls are no-ops
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            // no receivers just means nothing is waiting yet
            let _ = self.inner.signal.send(());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation has been requested
    pub async fn cancelled(&self) {
        // subscribe before checking the flag so a concurrent cancel is never missed
        let mut rx = self.inner.signal.subscribe();
        if self.is_cancelled() {
            return;
        }
        let _ = rx.recv().await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

//! Shutdown and cancellation coordination.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Notify};

use crate::error::{RelayError, RelayResult};

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cancellation token shared by one submission and everything it spawns.
///
/// Usable from async code (`cancelled`) and from blocking workers
/// (`is_cancelled`).
#[derive(Debug, Clone, Default)]
pub struct Cancel {
    state: Arc<CancelState>,
}

impl Cancel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        self.state.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation is requested.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.state.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Run `fut` unless cancellation wins the race.
    pub async fn run<T, F>(&self, fut: F) -> RelayResult<T>
    where
        F: std::future::Future<Output = RelayResult<T>>,
    {
        if self.is_cancelled() {
            return Err(RelayError::Cancelled);
        }
        tokio::select! {
            _ = self.cancelled() => Err(RelayError::Cancelled),
            result = fut => result,
        }
    }
}

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that long-running loops subscribe to, and a
/// [`Cancel`] token handed to in-flight submissions.
#[derive(Debug, Clone)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
    cancel: Cancel,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            cancel: Cancel::new(),
        }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Token cancelled when shutdown triggers.
    pub fn cancel_token(&self) -> Cancel {
        self.cancel.clone()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.cancel.cancel();
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

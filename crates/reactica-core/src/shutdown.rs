//! Cooperative shutdown signal.
//!
//! One [`Shutdown`] controller hands out any number of [`ShutdownSignal`]
//! watchers. The generator only checks its signal while it is waiting for
//! the next arrival, so a chain already in flight always finishes.

use tokio::sync::watch;

/// Controller side: request a shutdown.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    /// Create a controller with no shutdown requested.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Request shutdown. Every current and future watcher observes it.
    pub fn request(&self) {
        self.tx.send_replace(true);
    }

    /// Whether shutdown has been requested.
    pub fn is_requested(&self) -> bool {
        *self.tx.borrow()
    }

    /// A new watcher for this controller.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Watcher side: wait for a shutdown request.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Whether shutdown has been requested.
    pub fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown is requested.
    ///
    /// Never resolves if the controller is dropped without requesting
    /// shutdown. Cancel-safe.
    pub async fn requested(&mut self) {
        if self.rx.wait_for(|requested| *requested).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn request_wakes_watchers() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.signal();
        assert!(!signal.is_requested());

        let waiter = tokio::spawn(async move {
            signal.requested().await;
        });
        shutdown.request();
        let joined = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert!(joined.is_ok_and(|r| r.is_ok()));
        assert!(shutdown.is_requested());
    }

    #[tokio::test]
    async fn late_watchers_see_earlier_request() {
        let shutdown = Shutdown::new();
        shutdown.request();
        let mut signal = shutdown.signal();
        assert!(signal.is_requested());
        let resolved = tokio::time::timeout(Duration::from_millis(100), signal.requested()).await;
        assert!(resolved.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_controller_never_resolves() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.signal();
        drop(shutdown);
        let resolved = tokio::time::timeout(Duration::from_secs(60), signal.requested()).await;
        assert!(resolved.is_err());
    }
}

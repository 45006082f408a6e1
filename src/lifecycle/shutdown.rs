//! Shutdown coordination for the proxy.

use tokio::sync::broadcast;

/// Broadcasts a single "stop" to the server and any background task.
///
/// Receivers subscribed before `trigger` observe it; `signal` turns a
/// receiver into a future suitable for `with_graceful_shutdown`.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Resolve once `trigger` fires or every sender is gone.
    pub async fn signal(mut rx: broadcast::Receiver<()>) {
        let _ = rx.recv().await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

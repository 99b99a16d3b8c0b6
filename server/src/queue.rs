//! Per-client update delivery: a single-slot, deliver-or-drop queue.

use shared::Grid;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Holds at most one undelivered grid snapshot for one client.
///
/// The producer side is non-blocking: a snapshot arriving while one is
/// already pending is dropped, so a slow consumer only ever sees the most
/// recent world it managed to wait for, never a backlog. The consumer side
/// blocks until a snapshot is present.
#[derive(Debug, Clone)]
pub struct UpdateQueue {
    tx: mpsc::Sender<Grid>,
    rx: Arc<Mutex<mpsc::Receiver<Grid>>>,
}

impl UpdateQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Stores the snapshot if the slot is empty. Returns false when a
    /// snapshot was already pending and the new one was dropped.
    pub fn try_deliver(&self, snapshot: Grid) -> bool {
        self.tx.try_send(snapshot).is_ok()
    }

    /// Waits until a snapshot is available, then removes and returns it.
    pub async fn take(&self) -> Grid {
        let mut rx = self.rx.lock().await;
        // The queue owns a sender for its whole lifetime, so the channel
        // cannot close under the receiver.
        rx.recv().await.expect("update queue sender dropped")
    }
}

impl Default for UpdateQueue {
    fn default() -> Self {
        Self::new()
    }
}

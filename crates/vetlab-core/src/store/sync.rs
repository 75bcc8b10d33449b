//! Cross-instance change notification.
//!
//! A signal carries nothing but its sender's instance ID: "reload now".

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

/// Reload request sent after a store write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSignal {
    /// Instance that performed the write
    pub origin: Uuid,
}

/// Broadcast channel shared by every store instance over the same storage.
#[derive(Debug, Clone, Default)]
pub struct SyncBus {
    subscribers: Arc<Mutex<Vec<Sender<SyncSignal>>>>,
}

impl SyncBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener.
    pub fn subscribe(&self) -> Receiver<SyncSignal> {
        let (tx, rx) = channel();
        self.lock().push(tx);
        rx
    }

    /// Notify every live listener; dropped listeners are pruned.
    pub fn broadcast(&self, origin: Uuid) {
        let signal = SyncSignal { origin };
        self.lock().retain(|tx| tx.send(signal).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Sender<SyncSignal>>> {
        // The list stays consistent even if a holder panicked
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

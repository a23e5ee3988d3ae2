use std::sync::Arc;
use tokio::sync::watch;

use crate::model::Snapshot;

/// Holds the current published snapshot.
///
/// Readers get an `Arc` to a complete snapshot; publishing swaps the pointer
/// in one step, so a reader sees either the old snapshot or the new one.
/// The internal borrow lasts only as long as the pointer clone.
pub struct NewsCache {
    current: watch::Sender<Arc<Snapshot>>,
}

impl NewsCache {
    /// Empty cache, as served before the first cycle completes.
    pub fn new() -> Self {
        let (current, _) = watch::channel(Arc::new(Snapshot::default()));
        Self { current }
    }

    pub fn read(&self) -> Arc<Snapshot> {
        self.current.borrow().clone()
    }

    /// Replace the current snapshot wholesale.
    pub fn publish(&self, snapshot: Snapshot) {
        self.current.send_replace(Arc::new(snapshot));
    }

    /// Receiver that is notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.current.subscribe()
    }
}

impl Default for NewsCache {
    fn default() -> Self {
        Self::new()
    }
}

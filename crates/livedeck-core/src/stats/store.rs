use std::sync::Arc;

use super::model::StatsSnapshot;

/// Holds the single latest statistics snapshot.
///
/// Snapshots are shared behind an `Arc`: `replace` swaps the pointer and
/// `current` hands out a clone of it, so a reader keeps one whole record even
/// if a newer one lands while it is rendering.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    current: Arc<StatsSnapshot>,
    revision: u64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held snapshot wholesale. No field of the previous one survives.
    pub fn replace(&mut self, snapshot: StatsSnapshot) {
        self.current = Arc::new(snapshot);
        self.revision += 1;
    }

    /// The latest snapshot, or the all-zero default before the first arrival.
    pub fn current(&self) -> Arc<StatsSnapshot> {
        Arc::clone(&self.current)
    }

    /// Number of snapshots received so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_snapshot(&self) -> bool {
        self.revision > 0
    }
}

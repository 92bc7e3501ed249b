//! In-memory snapshot store for tests and dry runs.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::domain::snapshot::PortfolioSnapshot;
use crate::error::Result;
use crate::port::outbound::snapshot::SnapshotStore;

/// Snapshot histories held in memory, keyed by strategy name.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    histories: RwLock<BTreeMap<String, Vec<PortfolioSnapshot>>>,
}

impl MemorySnapshotStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn append(&self, strategy: &str, snapshot: &PortfolioSnapshot) -> Result<()> {
        self.histories
            .write()
            .entry(strategy.to_string())
            .or_default()
            .push(*snapshot);
        Ok(())
    }

    fn load(&self, strategy: &str) -> Result<Vec<PortfolioSnapshot>> {
        Ok(self
            .histories
            .read()
            .get(strategy)
            .cloned()
            .unwrap_or_default())
    }

    fn strategies(&self) -> Result<Vec<String>> {
        Ok(self.histories.read().keys().cloned().collect())
    }
}

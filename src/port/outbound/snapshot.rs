//! Persistence port for realized portfolio values.

use crate::domain::snapshot::PortfolioSnapshot;
use crate::error::Result;

/// Durable, per-strategy history of portfolio snapshots.
///
/// Only the owning strategy session appends to its history.
pub trait SnapshotStore: Send + Sync {
    /// Append a snapshot to a strategy's history.
    fn append(&self, strategy: &str, snapshot: &PortfolioSnapshot) -> Result<()>;

    /// Full history for a strategy, oldest first.
    fn load(&self, strategy: &str) -> Result<Vec<PortfolioSnapshot>>;

    /// Names of strategies with at least one snapshot, sorted.
    fn strategies(&self) -> Result<Vec<String>>;
}

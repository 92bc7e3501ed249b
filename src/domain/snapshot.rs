//! Realized portfolio value observations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Portfolio value at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl PortfolioSnapshot {
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Simple return relative to an earlier snapshot.
    ///
    /// Returns `None` when the earlier value is not positive.
    #[must_use]
    pub fn return_since(&self, previous: &Self) -> Option<f64> {
        if previous.value > 0.0 {
            Some((self.value - previous.value) / previous.value)
        } else {
            None
        }
    }
}

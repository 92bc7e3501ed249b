//! Informational portfolio metrics for a proposed allocation.

use serde::Serialize;

/// Expected value, risk, and concentration of one allocation.
///
/// Variance assumes zero correlation between markets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PortfolioMetrics {
    /// Sum of per-position expected profit under the model probabilities.
    pub expected_value: f64,
    /// `sum((position * volatility)^2)`.
    pub variance: f64,
    /// `expected_value / sqrt(variance)`, zero when variance is zero.
    pub sharpe_like: f64,
    /// Herfindahl index over capital weights.
    pub concentration: f64,
    pub max_position_weight: f64,
    pub position_count: usize,
}

impl PortfolioMetrics {
    #[must_use]
    pub fn standard_deviation(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Expected return on the whole capital base.
    #[must_use]
    pub fn expected_return(&self, total_capital: f64) -> f64 {
        if total_capital > 0.0 {
            self.expected_value / total_capital
        } else {
            0.0
        }
    }
}

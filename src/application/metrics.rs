//! Portfolio metrics for a proposed allocation.
//!
//! Purely informational: nothing here feeds back into sizing.

use std::collections::HashMap;

use crate::domain::allocation::Allocation;
use crate::domain::id::MarketId;
use crate::domain::metrics::PortfolioMetrics;
use crate::domain::opportunity::{Direction, Opportunity};

/// Expected profit of one bet under the model probability.
///
/// A `For` bet pays `stake / price` with probability `probability`; an
/// `Against` bet pays `stake / (1 - price)` with probability
/// `1 - probability`.
#[must_use]
pub fn expected_value(direction: Direction, probability: f64, price: f64, stake: f64) -> f64 {
    match direction {
        Direction::For => probability * stake / price - stake,
        Direction::Against => (1.0 - probability) * stake / (1.0 - price) - stake,
    }
}

/// Evaluate an allocation against the opportunities it was built from.
///
/// Variance treats markets as uncorrelated: `Σ(position · volatility)²`.
/// Positions without a matching opportunity contribute weight but no
/// expected value or variance.
#[must_use]
pub fn evaluate(allocation: &Allocation, opportunities: &[Opportunity]) -> PortfolioMetrics {
    let by_market: HashMap<&MarketId, &Opportunity> =
        opportunities.iter().map(|o| (o.market_id(), o)).collect();
    let capital = allocation.total_capital();

    let mut metrics = PortfolioMetrics {
        position_count: allocation.len(),
        ..PortfolioMetrics::default()
    };

    for position in allocation.positions() {
        let stake = position.stake();

        if let Some(opportunity) = by_market.get(&position.market_id) {
            metrics.expected_value += expected_value(
                position.direction(),
                opportunity.probability(),
                opportunity.price(),
                stake,
            );
            metrics.variance += (position.amount * opportunity.volatility()).powi(2);
        }

        if capital > 0.0 {
            let weight = stake / capital;
            metrics.concentration += weight * weight;
            metrics.max_position_weight = metrics.max_position_weight.max(weight);
        }
    }

    metrics.sharpe_like = if metrics.variance > 0.0 {
        metrics.expected_value / metrics.variance.sqrt()
    } else {
        0.0
    };

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::allocation::Position;
    use crate::testkit::domain::opportunity;

    #[test]
    fn expected_value_uses_model_probability() {
        // 10 at 0.40 pays 25 with p = 0.6: EV = 15 - 10
        assert!((expected_value(Direction::For, 0.6, 0.4, 10.0) - 5.0).abs() < 1e-9);
        // against at 0.75 pays 40 with p(no) = 0.4: EV = 16 - 10
        assert!((expected_value(Direction::Against, 0.6, 0.75, 10.0) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn evaluate_combines_positions() {
        let opportunities = vec![
            opportunity("a", 0.40, 0.60, 0.8),
            opportunity("b", 0.75, 0.60, 0.8),
        ];
        let allocation = Allocation::new(
            vec![
                Position {
                    market_id: MarketId::from("a"),
                    amount: 10.0,
                },
                Position {
                    market_id: MarketId::from("b"),
                    amount: -10.0,
                },
            ],
            100.0,
        )
        .unwrap();

        let metrics = evaluate(&allocation, &opportunities);

        assert!((metrics.expected_value - 11.0).abs() < 1e-9);
        // (10 * 0.15)^2 * 2
        assert!((metrics.variance - 4.5).abs() < 1e-9);
        assert!((metrics.sharpe_like - 11.0 / 4.5_f64.sqrt()).abs() < 1e-9);
        assert!((metrics.concentration - 0.02).abs() < 1e-12);
        assert!((metrics.max_position_weight - 0.1).abs() < 1e-12);
        assert_eq!(metrics.position_count, 2);
    }

    #[test]
    fn empty_allocation_has_zero_metrics() {
        let metrics = evaluate(&Allocation::empty(50.0), &[]);
        assert_eq!(metrics, PortfolioMetrics::default());
    }
}

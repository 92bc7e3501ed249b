//! Fractional Kelly position sizing.
//!
//! For decimal odds `b` the Kelly fraction is `|edge| / (b - 1)`, with
//! `b = 1 / price` when betting the priced outcome and `b = 1 / (1 - price)`
//! when betting against it. The result is scaled by the profile's safety
//! factor and signed by the direction of the edge. Sizes produced here are
//! pre-limit and must go through [`LimitEnforcer`](super::limits::LimitEnforcer).

use serde::Serialize;
use tracing::debug;

use crate::domain::allocation::{SkipReason, SkippedOpportunity};
use crate::domain::error::DegenerateInput;
use crate::domain::id::MarketId;
use crate::domain::opportunity::{Direction, Opportunity};

/// A signed, pre-limit position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawPosition {
    pub market_id: MarketId,
    /// Raw Kelly fraction before the safety factor.
    pub kelly_fraction: f64,
    /// Signed amount in currency units.
    pub amount: f64,
}

impl RawPosition {
    /// Same position multiplied by `factor`.
    #[must_use]
    pub fn scaled(mut self, factor: f64) -> Self {
        self.amount *= factor;
        self
    }
}

/// Decimal odds for a bet in `direction` at `price`.
///
/// # Errors
///
/// Returns [`DegenerateInput::PriceOutOfRange`] unless `0 < price < 1`.
pub fn decimal_odds(price: f64, direction: Direction) -> Result<f64, DegenerateInput> {
    if !(price.is_finite() && price > 0.0 && price < 1.0) {
        return Err(DegenerateInput::PriceOutOfRange { price });
    }
    Ok(match direction {
        Direction::For => 1.0 / price,
        Direction::Against => 1.0 / (1.0 - price),
    })
}

/// Raw Kelly fraction for an edge at a price.
///
/// # Errors
///
/// Returns [`DegenerateInput::PriceOutOfRange`] unless `0 < price < 1`.
pub fn kelly_fraction(price: f64, edge: f64) -> Result<f64, DegenerateInput> {
    let odds = decimal_odds(price, Direction::from_edge(edge))?;
    Ok(edge.abs() / (odds - 1.0))
}

/// Applies fractional Kelly to opportunities.
#[derive(Debug, Clone, Copy)]
pub struct PositionSizer {
    kelly_safety_factor: f64,
}

impl PositionSizer {
    #[must_use]
    pub const fn new(kelly_safety_factor: f64) -> Self {
        Self {
            kelly_safety_factor,
        }
    }

    #[must_use]
    pub const fn kelly_safety_factor(&self) -> f64 {
        self.kelly_safety_factor
    }

    /// Size one opportunity against the capital base.
    ///
    /// # Errors
    ///
    /// Returns [`DegenerateInput::PriceOutOfRange`] for a price outside (0, 1).
    pub fn size(
        &self,
        opportunity: &Opportunity,
        total_capital: f64,
    ) -> Result<RawPosition, DegenerateInput> {
        let kelly = kelly_fraction(opportunity.price(), opportunity.edge())?;
        let safe = kelly * self.kelly_safety_factor;
        Ok(RawPosition {
            market_id: opportunity.market_id().clone(),
            kelly_fraction: kelly,
            amount: opportunity.direction().sign() * safe * total_capital,
        })
    }

    /// Size a ranked list, preserving order. Zero-sized and degenerate
    /// entries are reported as skipped.
    #[must_use]
    pub fn size_all(
        &self,
        opportunities: &[Opportunity],
        total_capital: f64,
    ) -> (Vec<RawPosition>, Vec<SkippedOpportunity>) {
        let mut sized = Vec::with_capacity(opportunities.len());
        let mut skipped = Vec::new();

        for opportunity in opportunities {
            match self.size(opportunity, total_capital) {
                Ok(position) if position.amount == 0.0 => {
                    skipped.push(SkippedOpportunity::new(
                        position.market_id,
                        SkipReason::ZeroStake,
                    ));
                }
                Ok(position) => {
                    debug!(
                        market_id = %position.market_id,
                        kelly = position.kelly_fraction,
                        amount = position.amount,
                        "Sized position"
                    );
                    sized.push(position);
                }
                Err(input) => {
                    skipped.push(SkippedOpportunity::new(opportunity.market_id().clone(), input));
                }
            }
        }

        (sized, skipped)
    }
}

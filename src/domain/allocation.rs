//! Final capital allocation and skip diagnostics.
//!
//! An [`Allocation`] maps markets to signed bet amounts (positive bets the
//! priced outcome, negative bets against it) and carries the capital left
//! unallocated. It only exists after limit enforcement.

use std::fmt;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::error::DegenerateInput;
use super::id::MarketId;
use super::opportunity::Direction;
use crate::error::AllocationError;

/// Relative tolerance for the capital conservation invariant.
pub const CAPITAL_TOLERANCE: f64 = 1e-6;

/// Absolute tolerance for a given capital base.
#[must_use]
pub fn tolerance_for(total_capital: f64) -> f64 {
    CAPITAL_TOLERANCE * total_capital.abs().max(1.0)
}

/// A final, limit-checked position in one market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub market_id: MarketId,
    /// Signed bet amount in currency units.
    pub amount: f64,
}

impl Position {
    #[must_use]
    pub fn direction(&self) -> Direction {
        Direction::from_edge(self.amount)
    }

    /// Stake size regardless of direction.
    #[must_use]
    pub fn stake(&self) -> f64 {
        self.amount.abs()
    }
}

/// A position rounded to currency cents for the execution collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stake {
    pub market_id: MarketId,
    pub direction: Direction,
    /// Unsigned amount, rounded toward zero to cents.
    pub amount: Decimal,
}

/// Capital allocation for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    positions: Vec<Position>,
    unallocated_capital: f64,
    total_capital: f64,
}

impl Allocation {
    /// Allocation with no positions.
    #[must_use]
    pub fn empty(total_capital: f64) -> Self {
        Self {
            positions: Vec::new(),
            unallocated_capital: total_capital,
            total_capital,
        }
    }

    /// Build an allocation and check capital conservation.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::CapitalInvariantViolation`] when the
    /// positions exceed the capital base beyond tolerance.
    pub fn new(positions: Vec<Position>, total_capital: f64) -> Result<Self, AllocationError> {
        let allocated: f64 = positions.iter().map(Position::stake).sum();
        let allocation = Self {
            positions,
            unallocated_capital: total_capital - allocated,
            total_capital,
        };
        allocation.verify()?;
        Ok(allocation)
    }

    /// Check `sum(|amount|) + unallocated == total` and that no capital was
    /// created out of thin air.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::CapitalInvariantViolation`].
    pub fn verify(&self) -> Result<(), AllocationError> {
        let allocated = self.allocated();
        let tolerance = tolerance_for(self.total_capital);
        let conserved =
            (allocated + self.unallocated_capital - self.total_capital).abs() <= tolerance;
        let bounded = allocated <= self.total_capital + tolerance;
        let finite = self.positions.iter().all(|p| p.amount.is_finite());
        if conserved && bounded && finite {
            Ok(())
        } else {
            Err(AllocationError::CapitalInvariantViolation {
                allocated,
                unallocated: self.unallocated_capital,
                total: self.total_capital,
            })
        }
    }

    /// Positions in rank order.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Signed amount for a market, if it has a position.
    #[must_use]
    pub fn get(&self, market_id: &MarketId) -> Option<f64> {
        self.positions
            .iter()
            .find(|p| &p.market_id == market_id)
            .map(|p| p.amount)
    }

    /// Sum of absolute position sizes.
    #[must_use]
    pub fn allocated(&self) -> f64 {
        self.positions.iter().map(Position::stake).sum()
    }

    #[must_use]
    pub fn unallocated_capital(&self) -> f64 {
        self.unallocated_capital
    }

    #[must_use]
    pub fn total_capital(&self) -> f64 {
        self.total_capital
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions as cent-rounded stakes. Rounding is toward zero so the
    /// rounded total never exceeds the allocated amount.
    #[must_use]
    pub fn stakes(&self) -> Vec<Stake> {
        self.positions
            .iter()
            .map(|p| Stake {
                market_id: p.market_id.clone(),
                direction: p.direction(),
                amount: Decimal::from_f64(p.stake())
                    .unwrap_or(Decimal::ZERO)
                    .round_dp_with_strategy(2, RoundingStrategy::ToZero),
            })
            .collect()
    }
}

/// Why an entry of the batch did not make it into the allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Quote or forecast could not be evaluated.
    Degenerate {
        #[serde(serialize_with = "serialize_display")]
        input: DegenerateInput,
    },
    EdgeBelowThreshold { edge: f64, threshold: f64 },
    ConfidenceBelowThreshold { confidence: f64, threshold: f64 },
    ScoreBelowFloor { score: f64, floor: f64 },
    /// Ranked below the profile's position count cap.
    PositionCountLimit { max_positions: usize },
    /// Market already appeared earlier in the batch.
    DuplicateMarket,
    /// Sizing produced a zero stake.
    ZeroStake,
}

fn serialize_display<S: serde::Serializer>(
    input: &DegenerateInput,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(input)
}

impl SkipReason {
    /// True for input faults, as opposed to policy rejections.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::Degenerate { .. })
    }
}

impl From<DegenerateInput> for SkipReason {
    fn from(input: DegenerateInput) -> Self {
        Self::Degenerate { input }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degenerate { input } => write!(f, "degenerate input: {input}"),
            Self::EdgeBelowThreshold { edge, threshold } => {
                write!(f, "edge {edge:.4} below threshold {threshold:.4}")
            }
            Self::ConfidenceBelowThreshold {
                confidence,
                threshold,
            } => write!(f, "confidence {confidence:.3} below threshold {threshold:.3}"),
            Self::ScoreBelowFloor { score, floor } => {
                write!(f, "opportunity score {score:.4} below floor {floor:.4}")
            }
            Self::PositionCountLimit { max_positions } => {
                write!(f, "outside the top {max_positions} opportunities")
            }
            Self::DuplicateMarket => write!(f, "duplicate market in batch"),
            Self::ZeroStake => write!(f, "sized to a zero stake"),
        }
    }
}

/// A batch entry that was skipped, keyed by market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedOpportunity {
    pub market_id: MarketId,
    pub reason: SkipReason,
}

impl SkippedOpportunity {
    pub fn new(market_id: MarketId, reason: impl Into<SkipReason>) -> Self {
        Self {
            market_id,
            reason: reason.into(),
        }
    }
}

//! Exposure limits.
//!
//! Enforcement is two-pass and order-dependent: every position is first
//! clamped to the per-position cap, then, if the clamped total still exceeds
//! the aggregate cap, all positions are scaled by the same ratio so the total
//! lands exactly on the cap.

use serde::Serialize;
use tracing::{debug, info};

use super::sizing::RawPosition;
use crate::domain::allocation::{tolerance_for, Allocation, Position};
use crate::domain::id::MarketId;
use crate::domain::profile::StrategyProfile;
use crate::error::AllocationError;

/// What enforcement changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitAdjustments {
    /// Markets clamped to the per-position cap.
    pub clamped: Vec<MarketId>,
    /// Ratio applied to every position in the second pass, 1.0 when unscaled.
    pub scale_factor: f64,
    /// Sum of absolute positions after clamping, before scaling.
    pub clamped_total: f64,
}

impl LimitAdjustments {
    #[must_use]
    pub fn was_scaled(&self) -> bool {
        self.scale_factor < 1.0
    }
}

/// Clamps individual and aggregate exposure to a profile's caps.
#[derive(Debug, Clone, Copy)]
pub struct LimitEnforcer {
    max_position_fraction: f64,
    max_total_allocation_fraction: f64,
}

impl LimitEnforcer {
    #[must_use]
    pub const fn new(max_position_fraction: f64, max_total_allocation_fraction: f64) -> Self {
        Self {
            max_position_fraction,
            max_total_allocation_fraction,
        }
    }

    #[must_use]
    pub fn from_profile(profile: &StrategyProfile) -> Self {
        Self::new(
            profile.max_position_fraction,
            profile.max_total_allocation_fraction,
        )
    }

    /// Per-position cap in currency units.
    #[must_use]
    pub fn position_cap(&self, total_capital: f64) -> f64 {
        self.max_position_fraction * total_capital
    }

    /// Aggregate cap in currency units.
    #[must_use]
    pub fn total_cap(&self, total_capital: f64) -> f64 {
        self.max_total_allocation_fraction * total_capital
    }

    /// Turn raw positions into a final allocation.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::NonPositiveCapital`] for a capital base that
    /// is not positive, and [`AllocationError::CapitalInvariantViolation`] or
    /// [`AllocationError::LimitViolation`] if the result is inconsistent.
    pub fn enforce(
        &self,
        raw: &[RawPosition],
        total_capital: f64,
    ) -> Result<(Allocation, LimitAdjustments), AllocationError> {
        if !(total_capital > 0.0 && total_capital.is_finite()) {
            return Err(AllocationError::NonPositiveCapital {
                capital: total_capital,
            });
        }

        let position_cap = self.position_cap(total_capital);
        let mut clamped = Vec::new();
        let mut positions: Vec<Position> = raw
            .iter()
            .map(|p| {
                let amount = if p.amount.abs() > position_cap {
                    debug!(
                        market_id = %p.market_id,
                        raw = p.amount,
                        cap = position_cap,
                        "Clamped position to per-position cap"
                    );
                    clamped.push(p.market_id.clone());
                    position_cap.copysign(p.amount)
                } else {
                    p.amount
                };
                Position {
                    market_id: p.market_id.clone(),
                    amount,
                }
            })
            .collect();

        let clamped_total: f64 = positions.iter().map(Position::stake).sum();
        let total_cap = self.total_cap(total_capital);
        let scale_factor = if clamped_total > total_cap {
            total_cap / clamped_total
        } else {
            1.0
        };

        if scale_factor < 1.0 {
            info!(
                clamped_total,
                cap = total_cap,
                scale_factor,
                "Scaling positions to aggregate cap"
            );
            for position in &mut positions {
                position.amount *= scale_factor;
            }
        }

        let allocation = Allocation::new(positions, total_capital)?;
        self.audit(&allocation)?;

        Ok((
            allocation,
            LimitAdjustments {
                clamped,
                scale_factor,
                clamped_total,
            },
        ))
    }

    /// Re-check the per-position and aggregate caps on a final allocation.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::LimitViolation`] for the first broken cap.
    pub fn audit(&self, allocation: &Allocation) -> Result<(), AllocationError> {
        let capital = allocation.total_capital();
        let tolerance = tolerance_for(capital);

        let position_cap = self.position_cap(capital);
        if let Some(worst) = allocation
            .positions()
            .iter()
            .map(Position::stake)
            .max_by(f64::total_cmp)
        {
            if worst > position_cap + tolerance {
                return Err(AllocationError::LimitViolation {
                    limit: "max_position_fraction",
                    actual: worst,
                    cap: position_cap,
                });
            }
        }

        let total_cap = self.total_cap(capital);
        let allocated = allocation.allocated();
        if allocated > total_cap + tolerance {
            return Err(AllocationError::LimitViolation {
                limit: "max_total_allocation_fraction",
                actual: allocated,
                cap: total_cap,
            });
        }

        allocation.verify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, amount: f64) -> RawPosition {
        RawPosition {
            market_id: MarketId::from(id),
            kelly_fraction: 0.0,
            amount,
        }
    }

    #[test]
    fn clamps_individual_positions_preserving_sign() {
        let enforcer = LimitEnforcer::new(0.20, 0.80);
        let (allocation, adjustments) = enforcer
            .enforce(&[raw("a", 30.0), raw("b", -30.0)], 100.0)
            .unwrap();

        assert_eq!(allocation.get(&MarketId::from("a")), Some(20.0));
        assert_eq!(allocation.get(&MarketId::from("b")), Some(-20.0));
        assert_eq!(adjustments.clamped.len(), 2);
        assert!(!adjustments.was_scaled());
        assert!((allocation.unallocated_capital() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn scales_all_positions_to_total_cap() {
        let enforcer = LimitEnforcer::new(0.50, 0.80);
        let (allocation, adjustments) = enforcer
            .enforce(&[raw("a", 25.0), raw("b", 25.0)], 50.0)
            .unwrap();

        assert!((adjustments.scale_factor - 0.8).abs() < 1e-12);
        assert!((allocation.get(&MarketId::from("a")).unwrap() - 20.0).abs() < 1e-9);
        assert!((allocation.get(&MarketId::from("b")).unwrap() - 20.0).abs() < 1e-9);
        assert!((allocation.allocated() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn clamp_happens_before_scaling() {
        let enforcer = LimitEnforcer::new(0.20, 0.30);
        // a clamps to 20, b stays 15, total 35 > 30 so both scale by 30/35
        let (allocation, adjustments) = enforcer
            .enforce(&[raw("a", 80.0), raw("b", 15.0)], 100.0)
            .unwrap();

        let ratio = 30.0 / 35.0;
        assert_eq!(adjustments.clamped, vec![MarketId::from("a")]);
        assert!((allocation.get(&MarketId::from("a")).unwrap() - 20.0 * ratio).abs() < 1e-9);
        assert!((allocation.get(&MarketId::from("b")).unwrap() - 15.0 * ratio).abs() < 1e-9);
    }

    #[test]
    fn empty_input_keeps_all_capital() {
        let enforcer = LimitEnforcer::new(0.20, 0.80);
        let (allocation, adjustments) = enforcer.enforce(&[], 50.0).unwrap();
        assert!(allocation.is_empty());
        assert_eq!(allocation.unallocated_capital(), 50.0);
        assert_eq!(adjustments.scale_factor, 1.0);
    }

    #[test]
    fn rejects_non_positive_capital() {
        let enforcer = LimitEnforcer::new(0.20, 0.80);
        assert_eq!(
            enforcer.enforce(&[raw("a", 1.0)], 0.0).unwrap_err(),
            AllocationError::NonPositiveCapital { capital: 0.0 }
        );
    }

    #[test]
    fn audit_flags_oversized_position() {
        let allocation = Allocation::new(
            vec![Position {
                market_id: MarketId::from("a"),
                amount: 30.0,
            }],
            100.0,
        )
        .unwrap();
        let result = LimitEnforcer::new(0.20, 0.80).audit(&allocation);
        assert!(matches!(
            result,
            Err(AllocationError::LimitViolation {
                limit: "max_position_fraction",
                ..
            })
        ));
    }
}

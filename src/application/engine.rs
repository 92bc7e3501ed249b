//! One allocation cycle.
//!
//! The engine is synchronous and deterministic: a batch goes through
//! scoring, sizing, the optional risk reduction, limit enforcement, and
//! metrics evaluation, and comes out as a [`CycleReport`]. Per-entry
//! problems become skips; invariant failures reject the whole cycle.

use serde::Serialize;
use tracing::{info, instrument};

use super::limits::{LimitAdjustments, LimitEnforcer};
use super::metrics;
use super::scoring::{OpportunityScorer, ScoringPolicy};
use super::sizing::{PositionSizer, RawPosition};
use crate::domain::allocation::{Allocation, SkippedOpportunity};
use crate::domain::forecast::ForecastBatch;
use crate::domain::id::CycleId;
use crate::domain::metrics::PortfolioMetrics;
use crate::domain::opportunity::Opportunity;
use crate::domain::profile::StrategyProfile;
use crate::error::{AllocationError, ConfigError};

/// Everything one cycle produced.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle_id: CycleId,
    pub strategy: String,
    pub allocation: Allocation,
    pub metrics: PortfolioMetrics,
    /// Opportunities that made it into the allocation, in rank order.
    pub opportunities: Vec<Opportunity>,
    pub skipped: Vec<SkippedOpportunity>,
    pub adjustments: LimitAdjustments,
    /// Multiplier applied to raw Kelly sizes before limits.
    pub reduction_factor: f64,
}

/// Scorer, sizer, and enforcer for one strategy profile.
#[derive(Debug, Clone)]
pub struct AllocationEngine {
    profile: StrategyProfile,
    scorer: OpportunityScorer,
    sizer: PositionSizer,
    enforcer: LimitEnforcer,
}

impl AllocationEngine {
    /// Build an engine, validating the profile and policy up front.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an invalid profile or scoring policy.
    pub fn new(profile: StrategyProfile, policy: ScoringPolicy) -> Result<Self, ConfigError> {
        profile.validate()?;
        policy.validate()?;
        Ok(Self {
            scorer: OpportunityScorer::new(policy, &profile),
            sizer: PositionSizer::new(profile.kelly_safety_factor),
            enforcer: LimitEnforcer::from_profile(&profile),
            profile,
        })
    }

    #[must_use]
    pub fn profile(&self) -> &StrategyProfile {
        &self.profile
    }

    #[must_use]
    pub fn scorer(&self) -> &OpportunityScorer {
        &self.scorer
    }

    #[must_use]
    pub fn enforcer(&self) -> &LimitEnforcer {
        &self.enforcer
    }

    /// Run one cycle with no risk reduction.
    ///
    /// # Errors
    ///
    /// See [`run_with_reduction`](Self::run_with_reduction).
    pub fn run(
        &self,
        batch: &ForecastBatch,
        total_capital: f64,
    ) -> Result<CycleReport, AllocationError> {
        self.run_with_reduction(batch, total_capital, 1.0)
    }

    /// Run one cycle, multiplying raw Kelly sizes by `reduction_factor`
    /// before limits are applied.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError`] when the capital is not positive or the
    /// final allocation breaks an invariant.
    #[instrument(skip_all, fields(strategy = %self.profile.name, entries = batch.len()))]
    pub fn run_with_reduction(
        &self,
        batch: &ForecastBatch,
        total_capital: f64,
        reduction_factor: f64,
    ) -> Result<CycleReport, AllocationError> {
        if !(total_capital > 0.0 && total_capital.is_finite()) {
            return Err(AllocationError::NonPositiveCapital {
                capital: total_capital,
            });
        }

        let scored = self.scorer.rank(&batch.entries);
        let mut skipped = scored.skipped;

        let (raw, sizing_skips) = self.sizer.size_all(&scored.ranked, total_capital);
        skipped.extend(sizing_skips);

        let raw: Vec<RawPosition> = if reduction_factor < 1.0 {
            info!(reduction_factor, "Applying risk reduction to raw positions");
            raw.into_iter()
                .map(|p| p.scaled(reduction_factor))
                .collect()
        } else {
            raw
        };

        let (allocation, adjustments) = self.enforcer.enforce(&raw, total_capital)?;

        let opportunities: Vec<Opportunity> = scored
            .ranked
            .into_iter()
            .filter(|o| allocation.get(o.market_id()).is_some())
            .collect();
        let metrics = metrics::evaluate(&allocation, &opportunities);

        info!(
            positions = allocation.len(),
            skipped = skipped.len(),
            allocated = allocation.allocated(),
            unallocated = allocation.unallocated_capital(),
            expected_value = metrics.expected_value,
            "Allocation cycle complete"
        );

        Ok(CycleReport {
            cycle_id: CycleId::new(),
            strategy: self.profile.name.clone(),
            allocation,
            metrics,
            opportunities,
            skipped,
            adjustments,
            reduction_factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::allocation::SkipReason;
    use crate::domain::id::MarketId;
    use crate::testkit::domain::{batch, entry};

    fn engine() -> AllocationEngine {
        AllocationEngine::new(StrategyProfile::balanced(), ScoringPolicy::default()).unwrap()
    }

    #[test]
    fn single_opportunity_cycle() {
        let report = engine()
            .run(&batch(vec![entry("m", 0.40, 0.60, 0.8)]), 50.0)
            .unwrap();

        let amount = report.allocation.get(&MarketId::from("m")).unwrap();
        assert!((amount - 50.0 * 0.5 * 0.2 / 1.5).abs() < 1e-9);
        assert!((report.allocation.unallocated_capital() - (50.0 - amount)).abs() < 1e-9);
        assert!(report.metrics.expected_value > 0.0);
        assert_eq!(report.opportunities.len(), 1);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn reduction_scales_raw_positions() {
        let full = engine()
            .run(&batch(vec![entry("m", 0.40, 0.60, 0.8)]), 50.0)
            .unwrap();
        let reduced = engine()
            .run_with_reduction(&batch(vec![entry("m", 0.40, 0.60, 0.8)]), 50.0, 0.5)
            .unwrap();

        let id = MarketId::from("m");
        let ratio = reduced.allocation.get(&id).unwrap() / full.allocation.get(&id).unwrap();
        assert!((ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn degenerate_entry_does_not_abort_cycle() {
        let report = engine()
            .run(
                &batch(vec![entry("bad", 0.0, 0.60, 0.8), entry("ok", 0.40, 0.60, 0.8)]),
                50.0,
            )
            .unwrap();

        assert_eq!(report.allocation.len(), 1);
        assert!(report.skipped[0].reason.is_degenerate());
    }

    #[test]
    fn rejects_non_positive_capital() {
        let result = engine().run(&batch(vec![entry("m", 0.40, 0.60, 0.8)]), -5.0);
        assert!(matches!(
            result,
            Err(AllocationError::NonPositiveCapital { .. })
        ));
    }

    #[test]
    fn invalid_profile_fails_at_construction() {
        let mut profile = StrategyProfile::balanced();
        profile.max_position_fraction = 0.0;
        assert!(AllocationEngine::new(profile, ScoringPolicy::default()).is_err());
    }

    #[test]
    fn threshold_rejections_are_reported() {
        let report = engine()
            .run(&batch(vec![entry("thin", 0.50, 0.52, 0.9)]), 50.0)
            .unwrap();
        assert!(report.allocation.is_empty());
        assert!(matches!(
            report.skipped[0].reason,
            SkipReason::EdgeBelowThreshold { .. }
        ));
    }
}

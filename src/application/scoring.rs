//! Opportunity scoring and ranking.
//!
//! Turns quote/forecast pairs into ranked [`Opportunity`] values. Entries
//! that cannot be evaluated or that fail a threshold are reported as
//! [`SkippedOpportunity`] and never abort the batch.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::allocation::{SkipReason, SkippedOpportunity};
use crate::domain::error::DegenerateInput;
use crate::domain::forecast::{ConfidenceWeights, ForecastEntry, ForecastEstimate};
use crate::domain::market::MarketQuote;
use crate::domain::opportunity::{Opportunity, OpportunityParts};
use crate::domain::profile::StrategyProfile;
use crate::error::ConfigError;

/// Scoring parameters shared by every strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub weights: ConfidenceWeights,
    /// Liquidity at which the liquidity factor saturates at 1.
    pub reference_liquidity: f64,
    /// Floor on `|edge| * confidence * liquidity_factor`.
    pub min_opportunity_score: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            weights: ConfidenceWeights::default(),
            reference_liquidity: 10_000.0,
            min_opportunity_score: 0.03,
        }
    }
}

impl ScoringPolicy {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for bad weights, a non-positive
    /// reference liquidity, or a negative score floor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        if !(self.reference_liquidity > 0.0 && self.reference_liquidity.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "scoring.reference_liquidity",
                reason: format!("must be positive, got {}", self.reference_liquidity),
            });
        }
        if !(self.min_opportunity_score >= 0.0 && self.min_opportunity_score.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "scoring.min_opportunity_score",
                reason: format!("must be non-negative, got {}", self.min_opportunity_score),
            });
        }
        Ok(())
    }

    /// `min(1, liquidity / reference_liquidity)`.
    #[must_use]
    pub fn liquidity_factor(&self, liquidity: f64) -> f64 {
        (liquidity / self.reference_liquidity).min(1.0)
    }
}

/// Ranked opportunities plus everything that was filtered out.
#[derive(Debug, Clone, Default)]
pub struct ScoredBatch {
    /// Opportunities in rank order, at most `max_positions` long.
    pub ranked: Vec<Opportunity>,
    pub skipped: Vec<SkippedOpportunity>,
}

/// Scores quote/forecast pairs against one profile's thresholds.
#[derive(Debug, Clone)]
pub struct OpportunityScorer {
    policy: ScoringPolicy,
    min_edge: f64,
    min_confidence: f64,
    max_positions: usize,
    default_volatility: Option<f64>,
}

impl OpportunityScorer {
    #[must_use]
    pub fn new(policy: ScoringPolicy, profile: &StrategyProfile) -> Self {
        Self {
            policy,
            min_edge: profile.min_edge_threshold,
            min_confidence: profile.min_confidence_threshold,
            max_positions: profile.max_positions,
            default_volatility: profile.default_volatility,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Score one pair.
    ///
    /// Returns `Ok(None)` when the pair is valid but not actionable.
    ///
    /// # Errors
    ///
    /// Returns [`DegenerateInput`] when the pair cannot be evaluated.
    pub fn score(
        &self,
        quote: &MarketQuote,
        forecast: &ForecastEstimate,
    ) -> Result<Option<Opportunity>, DegenerateInput> {
        match self.assess(quote, forecast) {
            Ok(opportunity) => Ok(Some(opportunity)),
            Err(SkipReason::Degenerate { input }) => Err(input),
            Err(_) => Ok(None),
        }
    }

    /// Score one pair, reporting why it was rejected.
    ///
    /// # Errors
    ///
    /// Returns the [`SkipReason`] for a degenerate or below-threshold pair.
    pub fn assess(
        &self,
        quote: &MarketQuote,
        forecast: &ForecastEstimate,
    ) -> Result<Opportunity, SkipReason> {
        if quote.market_id != forecast.market_id {
            return Err(DegenerateInput::MarketMismatch {
                quote: quote.market_id.clone(),
                forecast: forecast.market_id.clone(),
            }
            .into());
        }
        quote.validate()?;
        forecast.validate()?;
        let liquidity = quote.liquidity()?;
        let factors = forecast.confidence_factors()?;
        let volatility = quote.volatility_or(self.default_volatility)?;

        let edge = forecast.probability - quote.price;
        let confidence = factors.composite(&self.policy.weights);
        let liquidity_factor = self.policy.liquidity_factor(liquidity);

        if edge.abs() < self.min_edge {
            return Err(SkipReason::EdgeBelowThreshold {
                edge,
                threshold: self.min_edge,
            });
        }
        if confidence < self.min_confidence {
            return Err(SkipReason::ConfidenceBelowThreshold {
                confidence,
                threshold: self.min_confidence,
            });
        }

        let flags = forecast
            .evidence
            .as_ref()
            .map(|evidence| evidence.flags(liquidity, self.policy.reference_liquidity))
            .unwrap_or_default();

        let opportunity = Opportunity::from_parts(OpportunityParts {
            market_id: quote.market_id.clone(),
            question: quote.question.clone(),
            price: quote.price,
            probability: forecast.probability,
            confidence,
            liquidity_factor,
            volatility,
            flags,
        });

        if opportunity.score() < self.policy.min_opportunity_score {
            return Err(SkipReason::ScoreBelowFloor {
                score: opportunity.score(),
                floor: self.policy.min_opportunity_score,
            });
        }
        Ok(opportunity)
    }

    /// Score a whole batch and rank the survivors.
    ///
    /// The first entry for a market wins; later duplicates are skipped.
    /// Only the top `max_positions` opportunities are kept.
    #[must_use]
    pub fn rank(&self, entries: &[ForecastEntry]) -> ScoredBatch {
        let mut seen = HashSet::new();
        let mut batch = ScoredBatch::default();

        for entry in entries {
            let market_id = entry.market_id();
            if !seen.insert(market_id.clone()) {
                debug!(market_id = %market_id, "Duplicate market in batch");
                batch
                    .skipped
                    .push(SkippedOpportunity::new(market_id.clone(), SkipReason::DuplicateMarket));
                continue;
            }

            match self.assess(&entry.quote, &entry.forecast) {
                Ok(opportunity) => batch.ranked.push(opportunity),
                Err(reason) => {
                    if reason.is_degenerate() {
                        warn!(market_id = %market_id, reason = %reason, "Skipping degenerate input");
                    } else {
                        debug!(market_id = %market_id, reason = %reason, "Opportunity rejected");
                    }
                    batch
                        .skipped
                        .push(SkippedOpportunity::new(market_id.clone(), reason));
                }
            }
        }

        batch.ranked.sort_by(Opportunity::rank_cmp);

        if batch.ranked.len() > self.max_positions {
            for dropped in batch.ranked.split_off(self.max_positions) {
                debug!(
                    market_id = %dropped.market_id(),
                    max_positions = self.max_positions,
                    "Opportunity outside position count cap"
                );
                batch.skipped.push(SkippedOpportunity::new(
                    dropped.market_id().clone(),
                    SkipReason::PositionCountLimit {
                        max_positions: self.max_positions,
                    },
                ));
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evidence::{ConfidenceLevel, InformationQuality, ResearchEvidence, Source};
    use crate::domain::forecast::ConfidenceFactors;

    fn uniform(value: f64) -> ConfidenceFactors {
        ConfidenceFactors::new(value, value, value, value, value)
    }

    fn entry(id: &str, price: f64, probability: f64, confidence: f64) -> ForecastEntry {
        ForecastEntry::new(
            MarketQuote::new(id, price, Some(20_000.0)),
            ForecastEstimate::new(id, probability, uniform(confidence)),
        )
    }

    fn scorer() -> OpportunityScorer {
        OpportunityScorer::new(ScoringPolicy::default(), &StrategyProfile::balanced())
    }

    #[test]
    fn scores_actionable_pair() {
        let e = entry("m", 0.40, 0.60, 0.8);
        let opportunity = scorer().score(&e.quote, &e.forecast).unwrap().unwrap();

        assert!((opportunity.edge() - 0.20).abs() < 1e-12);
        assert!((opportunity.confidence() - 0.8).abs() < 1e-12);
        assert_eq!(opportunity.liquidity_factor(), 1.0);
        assert_eq!(opportunity.volatility(), 0.15);
    }

    #[test]
    fn small_edge_is_rejected_not_failed() {
        let e = entry("m", 0.50, 0.52, 0.9);
        assert_eq!(scorer().score(&e.quote, &e.forecast), Ok(None));
        assert!(matches!(
            scorer().assess(&e.quote, &e.forecast),
            Err(SkipReason::EdgeBelowThreshold { .. })
        ));
    }

    #[test]
    fn low_confidence_is_rejected() {
        let e = entry("m", 0.40, 0.60, 0.3);
        assert!(matches!(
            scorer().assess(&e.quote, &e.forecast),
            Err(SkipReason::ConfidenceBelowThreshold { .. })
        ));
    }

    #[test]
    fn thin_liquidity_falls_below_score_floor() {
        let quote = MarketQuote::new("m", 0.40, Some(1_000.0));
        let forecast = ForecastEstimate::new("m", 0.60, uniform(0.8));
        // score = 0.2 * 0.8 * 0.1 = 0.016 < 0.03
        assert!(matches!(
            scorer().assess(&quote, &forecast),
            Err(SkipReason::ScoreBelowFloor { .. })
        ));
    }

    #[test]
    fn zero_price_is_degenerate() {
        let e = entry("m", 0.0, 0.60, 0.8);
        assert!(matches!(
            scorer().score(&e.quote, &e.forecast),
            Err(DegenerateInput::PriceOutOfRange { .. })
        ));
    }

    #[test]
    fn mismatched_markets_are_degenerate() {
        let quote = MarketQuote::new("a", 0.40, Some(20_000.0));
        let forecast = ForecastEstimate::new("b", 0.60, uniform(0.8));
        assert!(matches!(
            scorer().score(&quote, &forecast),
            Err(DegenerateInput::MarketMismatch { .. })
        ));
    }

    #[test]
    fn rank_orders_by_score_and_reports_skips() {
        let entries = vec![
            entry("small", 0.50, 0.52, 0.9),
            entry("mid", 0.40, 0.50, 0.8),
            entry("top", 0.40, 0.70, 0.8),
            entry("bad", 1.0, 0.70, 0.8),
            entry("top", 0.30, 0.90, 0.9),
        ];
        let batch = scorer().rank(&entries);

        let ranked: Vec<_> = batch.ranked.iter().map(|o| o.market_id().as_str()).collect();
        assert_eq!(ranked, vec!["top", "mid"]);

        let skipped: Vec<_> = batch
            .skipped
            .iter()
            .map(|s| (s.market_id.as_str(), s.reason.clone()))
            .collect();
        assert_eq!(skipped.len(), 3);
        assert!(matches!(skipped[0], ("small", SkipReason::EdgeBelowThreshold { .. })));
        assert!(matches!(skipped[1], ("bad", SkipReason::Degenerate { .. })));
        assert_eq!(skipped[2], ("top", SkipReason::DuplicateMarket));
    }

    #[test]
    fn rank_caps_position_count() {
        let mut profile = StrategyProfile::balanced();
        profile.max_positions = 2;
        let scorer = OpportunityScorer::new(ScoringPolicy::default(), &profile);
        let entries = vec![
            entry("a", 0.40, 0.60, 0.8),
            entry("b", 0.40, 0.70, 0.8),
            entry("c", 0.40, 0.80, 0.8),
        ];
        let batch = scorer.rank(&entries);

        let ranked: Vec<_> = batch.ranked.iter().map(|o| o.market_id().as_str()).collect();
        assert_eq!(ranked, vec!["c", "b"]);
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(
            batch.skipped[0].reason,
            SkipReason::PositionCountLimit { max_positions: 2 }
        );
    }

    #[test]
    fn evidence_backed_forecast_carries_flags() {
        let evidence = ResearchEvidence {
            sources: vec![
                Source::new("https://a.example/1", 5),
                Source::new("https://b.example/2", 4),
            ],
            information_quality: InformationQuality::High,
            confidence_level: ConfidenceLevel::High,
            reasoning: "r".repeat(1200),
            confidence_interval: Some((0.55, 0.75)),
            recent_developments: true,
            key_findings: 6,
        };
        let quote = MarketQuote::new("m", 0.40, Some(50_000.0));
        let forecast = ForecastEstimate::from_evidence("m", 0.65, evidence);
        let opportunity = scorer().assess(&quote, &forecast).unwrap();

        assert!(opportunity.flags().red.iter().any(|f| f.contains("low source diversity")));
        assert!(opportunity.flags().green.iter().any(|f| f.contains("good liquidity")));
    }

    #[test]
    fn policy_rejects_zero_reference_liquidity() {
        let policy = ScoringPolicy {
            reference_liquidity: 0.0,
            ..ScoringPolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(ConfigError::InvalidValue {
                field: "scoring.reference_liquidity",
                ..
            })
        ));
    }
}

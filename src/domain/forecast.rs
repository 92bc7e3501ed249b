//! Forecast estimates and confidence scoring inputs.
//!
//! A [`ForecastEstimate`] is the research collaborator's view of one market:
//! a probability plus five confidence sub-scores. The sub-scores are either
//! supplied directly or derived from [`ResearchEvidence`].
//!
//! # Examples
//!
//! ```
//! use bankroll::domain::forecast::{ConfidenceFactors, ConfidenceWeights};
//!
//! let factors = ConfidenceFactors::new(0.8, 0.6, 0.4, 0.8, 0.6);
//! let composite = factors.composite(&ConfidenceWeights::default());
//! assert!((composite - 0.65).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use super::error::DegenerateInput;
use super::evidence::ResearchEvidence;
use super::id::MarketId;
use super::market::MarketQuote;
use crate::error::ConfigError;

/// Tolerance used when checking that confidence weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// The five confidence sub-scores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    /// Credibility of the sources consulted.
    pub source_quality: f64,
    /// How recent the information is.
    pub information_recency: f64,
    /// Source diversity and agreement.
    pub consensus: f64,
    /// Agreement with historical base rates.
    pub base_rate_alignment: f64,
    /// Clarity of the reasoning behind the estimate.
    pub reasoning_clarity: f64,
}

impl ConfidenceFactors {
    /// Creates confidence factors from raw sub-scores.
    #[must_use]
    pub const fn new(
        source_quality: f64,
        information_recency: f64,
        consensus: f64,
        base_rate_alignment: f64,
        reasoning_clarity: f64,
    ) -> Self {
        Self {
            source_quality,
            information_recency,
            consensus,
            base_rate_alignment,
            reasoning_clarity,
        }
    }

    /// Weighted sum of the sub-scores.
    #[must_use]
    pub fn composite(&self, weights: &ConfidenceWeights) -> f64 {
        self.source_quality * weights.source_quality
            + self.information_recency * weights.information_recency
            + self.consensus * weights.consensus
            + self.base_rate_alignment * weights.base_rate_alignment
            + self.reasoning_clarity * weights.reasoning_clarity
    }

    /// Check every sub-score lies in [0, 1].
    ///
    /// # Errors
    ///
    /// Returns [`DegenerateInput::FactorOutOfRange`] naming the first bad sub-score.
    pub fn validate(&self) -> Result<(), DegenerateInput> {
        DegenerateInput::check_unit("source_quality", self.source_quality)?;
        DegenerateInput::check_unit("information_recency", self.information_recency)?;
        DegenerateInput::check_unit("consensus", self.consensus)?;
        DegenerateInput::check_unit("base_rate_alignment", self.base_rate_alignment)?;
        DegenerateInput::check_unit("reasoning_clarity", self.reasoning_clarity)?;
        Ok(())
    }
}

/// Weights for combining confidence sub-scores. Must sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub source_quality: f64,
    pub information_recency: f64,
    pub consensus: f64,
    pub base_rate_alignment: f64,
    pub reasoning_clarity: f64,
}

impl ConfidenceWeights {
    /// Sum of all five weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.source_quality
            + self.information_recency
            + self.consensus
            + self.base_rate_alignment
            + self.reasoning_clarity
    }

    /// Check the weights are non-negative and sum to one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a negative weight or a sum
    /// further than [`WEIGHT_SUM_TOLERANCE`] from one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("weights.source_quality", self.source_quality),
            ("weights.information_recency", self.information_recency),
            ("weights.consensus", self.consensus),
            ("weights.base_rate_alignment", self.base_rate_alignment),
            ("weights.reasoning_clarity", self.reasoning_clarity),
        ];
        for (field, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be a non-negative number, got {value}"),
                });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::InvalidValue {
                field: "weights",
                reason: format!("must sum to 1, got {sum}"),
            });
        }
        Ok(())
    }
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            source_quality: 0.25,
            information_recency: 0.20,
            consensus: 0.20,
            base_rate_alignment: 0.20,
            reasoning_clarity: 0.15,
        }
    }
}

/// A probability estimate for one market from the research collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEstimate {
    /// Market identifier.
    pub market_id: MarketId,
    /// Estimated probability of the YES outcome.
    pub probability: f64,
    /// Explicit confidence sub-scores.
    #[serde(default)]
    pub factors: Option<ConfidenceFactors>,
    /// Research evidence the sub-scores can be derived from.
    #[serde(default)]
    pub evidence: Option<ResearchEvidence>,
}

impl ForecastEstimate {
    /// Create an estimate with explicit sub-scores.
    pub fn new(
        market_id: impl Into<MarketId>,
        probability: f64,
        factors: ConfidenceFactors,
    ) -> Self {
        Self {
            market_id: market_id.into(),
            probability,
            factors: Some(factors),
            evidence: None,
        }
    }

    /// Create an estimate whose sub-scores are derived from research evidence.
    pub fn from_evidence(
        market_id: impl Into<MarketId>,
        probability: f64,
        evidence: ResearchEvidence,
    ) -> Self {
        Self {
            market_id: market_id.into(),
            probability,
            factors: None,
            evidence: Some(evidence),
        }
    }

    /// Resolve the confidence sub-scores. Explicit factors win over evidence.
    ///
    /// # Errors
    ///
    /// Returns [`DegenerateInput::MissingConfidence`] when neither is present,
    /// or [`DegenerateInput::FactorOutOfRange`] for an invalid sub-score.
    pub fn confidence_factors(&self) -> Result<ConfidenceFactors, DegenerateInput> {
        let factors = match (&self.factors, &self.evidence) {
            (Some(factors), _) => *factors,
            (None, Some(evidence)) => ConfidenceFactors::from_evidence(evidence),
            (None, None) => return Err(DegenerateInput::MissingConfidence),
        };
        factors.validate()?;
        Ok(factors)
    }

    /// Check the probability lies in [0, 1].
    ///
    /// # Errors
    ///
    /// Returns [`DegenerateInput::ProbabilityOutOfRange`].
    pub fn validate(&self) -> Result<(), DegenerateInput> {
        if self.probability.is_finite() && (0.0..=1.0).contains(&self.probability) {
            Ok(())
        } else {
            Err(DegenerateInput::ProbabilityOutOfRange {
                probability: self.probability,
            })
        }
    }
}

/// A quote paired with the forecast for the same market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub quote: MarketQuote,
    pub forecast: ForecastEstimate,
}

impl ForecastEntry {
    pub fn new(quote: MarketQuote, forecast: ForecastEstimate) -> Self {
        Self { quote, forecast }
    }

    /// The market this entry is about (taken from the quote).
    #[must_use]
    pub fn market_id(&self) -> &MarketId {
        &self.quote.market_id
    }
}

/// Research spend reported alongside a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchUsage {
    /// Number of research provider calls made to produce the batch.
    #[serde(default)]
    pub calls: u32,
    /// Total research cost in currency units.
    #[serde(default)]
    pub cost: f64,
}

/// One cycle's worth of forecasts from the research collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastBatch {
    pub entries: Vec<ForecastEntry>,
    #[serde(default)]
    pub research: ResearchUsage,
}

impl ForecastBatch {
    pub fn new(entries: Vec<ForecastEntry>) -> Self {
        Self {
            entries,
            research: ResearchUsage::default(),
        }
    }

    /// Parse a batch from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns a JSON error when the document does not match the batch shape.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Opportunity scoring configuration.

use serde::Deserialize;

use crate::application::scoring::ScoringPolicy;
use crate::domain::forecast::ConfidenceWeights;

/// Scoring configuration shared by all strategies.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Liquidity at which the liquidity factor reaches 1.
    #[serde(default = "default_reference_liquidity")]
    pub reference_liquidity: f64,
    /// Floor on the opportunity score.
    #[serde(default = "default_min_opportunity_score")]
    pub min_opportunity_score: f64,
    /// Confidence sub-score weights; must sum to 1.
    #[serde(default)]
    pub weights: WeightsConfig,
}

/// Confidence weights as written in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_source_quality")]
    pub source_quality: f64,
    #[serde(default = "default_information_recency")]
    pub information_recency: f64,
    #[serde(default = "default_consensus")]
    pub consensus: f64,
    #[serde(default = "default_base_rate_alignment")]
    pub base_rate_alignment: f64,
    #[serde(default = "default_reasoning_clarity")]
    pub reasoning_clarity: f64,
}

const fn default_reference_liquidity() -> f64 {
    10_000.0
}

const fn default_min_opportunity_score() -> f64 {
    0.03
}

const fn default_source_quality() -> f64 {
    0.25
}

const fn default_information_recency() -> f64 {
    0.20
}

const fn default_consensus() -> f64 {
    0.20
}

const fn default_base_rate_alignment() -> f64 {
    0.20
}

const fn default_reasoning_clarity() -> f64 {
    0.15
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            source_quality: default_source_quality(),
            information_recency: default_information_recency(),
            consensus: default_consensus(),
            base_rate_alignment: default_base_rate_alignment(),
            reasoning_clarity: default_reasoning_clarity(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            reference_liquidity: default_reference_liquidity(),
            min_opportunity_score: default_min_opportunity_score(),
            weights: WeightsConfig::default(),
        }
    }
}

impl From<&WeightsConfig> for ConfidenceWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            source_quality: config.source_quality,
            information_recency: config.information_recency,
            consensus: config.consensus,
            base_rate_alignment: config.base_rate_alignment,
            reasoning_clarity: config.reasoning_clarity,
        }
    }
}

impl From<&ScoringConfig> for ScoringPolicy {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            weights: ConfidenceWeights::from(&config.weights),
            reference_liquidity: config.reference_liquidity,
            min_opportunity_score: config.min_opportunity_score,
        }
    }
}

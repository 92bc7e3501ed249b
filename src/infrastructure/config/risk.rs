//! Risk monitor configuration.

use serde::Deserialize;

use crate::domain::risk::{RiskLimits, DEFAULT_WINDOW};

/// Risk monitor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    /// Drawdown at which the monitor reports BREACH (e.g., 0.20 = 20%).
    #[serde(default = "default_max_drawdown_threshold")]
    pub max_drawdown_threshold: f64,
    /// Minimum acceptable annualized Sharpe ratio.
    #[serde(default = "default_min_sharpe_ratio")]
    pub min_sharpe_ratio: f64,
    /// Maximum acceptable annualized volatility.
    #[serde(default = "default_max_volatility")]
    pub max_volatility: f64,
    /// Confidence level for historical VaR.
    #[serde(default = "default_var_confidence")]
    pub var_confidence: f64,
    /// Rolling window length in snapshots (default: 252).
    #[serde(default = "default_window")]
    pub window: usize,
    /// Scale raw Kelly sizes by the monitor's reduction factor.
    #[serde(default = "default_apply_reduction")]
    pub apply_reduction: bool,
}

const fn default_max_drawdown_threshold() -> f64 {
    0.20
}

const fn default_min_sharpe_ratio() -> f64 {
    0.5
}

const fn default_max_volatility() -> f64 {
    0.50
}

const fn default_var_confidence() -> f64 {
    0.95
}

const fn default_window() -> usize {
    DEFAULT_WINDOW
}

const fn default_apply_reduction() -> bool {
    true
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_drawdown_threshold: default_max_drawdown_threshold(),
            min_sharpe_ratio: default_min_sharpe_ratio(),
            max_volatility: default_max_volatility(),
            var_confidence: default_var_confidence(),
            window: default_window(),
            apply_reduction: default_apply_reduction(),
        }
    }
}

impl From<&RiskConfig> for RiskLimits {
    fn from(config: &RiskConfig) -> Self {
        Self {
            max_drawdown_threshold: config.max_drawdown_threshold,
            min_sharpe_ratio: config.min_sharpe_ratio,
            max_volatility: config.max_volatility,
            var_confidence: config.var_confidence,
            window: config.window,
        }
    }
}

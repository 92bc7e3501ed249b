//! Risk limits, metrics, and levels for realized portfolio values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Trading days per year, used to annualize daily statistics.
pub const TRADING_DAYS: f64 = 252.0;

/// Default rolling window length in snapshots.
pub const DEFAULT_WINDOW: usize = 252;

/// Smallest position reduction factor the monitor will recommend.
pub const MIN_REDUCTION_FACTOR: f64 = 0.10;

/// Fraction of the drawdown threshold at which the WARNING level starts.
pub const WARNING_RATIO: f64 = 0.8;

/// Risk state derived from the current drawdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Normal,
    Warning,
    Breach,
}

impl RiskLevel {
    /// Level for a drawdown against a threshold.
    #[must_use]
    pub fn classify(drawdown: f64, threshold: f64) -> Self {
        if drawdown > threshold {
            Self::Breach
        } else if drawdown > WARNING_RATIO * threshold {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Warning => "WARNING",
            Self::Breach => "BREACH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds the monitor checks realized values against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLimits {
    pub max_drawdown_threshold: f64,
    pub min_sharpe_ratio: f64,
    pub max_volatility: f64,
    /// Confidence level for historical VaR, e.g. 0.95.
    pub var_confidence: f64,
    /// Rolling window length in snapshots.
    pub window: usize,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_drawdown_threshold: 0.20,
            min_sharpe_ratio: 0.5,
            max_volatility: 0.50,
            var_confidence: 0.95,
            window: DEFAULT_WINDOW,
        }
    }
}

impl RiskLimits {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_drawdown_threshold > 0.0 && self.max_drawdown_threshold <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "risk.max_drawdown_threshold",
                reason: format!("must be in (0, 1], got {}", self.max_drawdown_threshold),
            });
        }
        if !self.min_sharpe_ratio.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "risk.min_sharpe_ratio",
                reason: "must be finite".to_string(),
            });
        }
        if !(self.max_volatility > 0.0 && self.max_volatility.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "risk.max_volatility",
                reason: format!("must be positive, got {}", self.max_volatility),
            });
        }
        if !(self.var_confidence > 0.0 && self.var_confidence < 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "risk.var_confidence",
                reason: format!("must be in (0, 1), got {}", self.var_confidence),
            });
        }
        if self.window < 2 {
            return Err(ConfigError::InvalidValue {
                field: "risk.window",
                reason: format!("must hold at least 2 snapshots, got {}", self.window),
            });
        }
        Ok(())
    }
}

/// Summary statistics over the rolling window.
///
/// With fewer than two snapshots every statistic is zero and
/// `sufficient_history` is false. Drawdown figures are always populated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RiskMetrics {
    pub sufficient_history: bool,
    /// Snapshots in the rolling window.
    pub observations: usize,
    /// Annualized standard deviation of daily returns.
    pub volatility: f64,
    /// Annualized mean daily return.
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    /// Historical VaR as a non-negative loss fraction.
    pub value_at_risk: f64,
    pub peak_value: f64,
    pub current_drawdown: f64,
    pub max_drawdown: f64,
}

/// A limit the realized history currently breaks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiskViolation {
    Drawdown { current: f64, threshold: f64 },
    Sharpe { actual: f64, minimum: f64 },
    Volatility { actual: f64, maximum: f64 },
}

impl fmt::Display for RiskViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drawdown { current, threshold } => write!(
                f,
                "drawdown {:.2}% exceeds {:.2}%",
                current * 100.0,
                threshold * 100.0
            ),
            Self::Sharpe { actual, minimum } => {
                write!(f, "sharpe {actual:.2} below minimum {minimum:.2}")
            }
            Self::Volatility { actual, maximum } => write!(
                f,
                "volatility {:.2}% exceeds {:.2}%",
                actual * 100.0,
                maximum * 100.0
            ),
        }
    }
}

/// The three independently computed reduction factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReductionFactors {
    pub drawdown: f64,
    pub sharpe: f64,
    pub volatility: f64,
}

impl ReductionFactors {
    /// No reduction.
    pub const NONE: Self = Self {
        drawdown: 1.0,
        sharpe: 1.0,
        volatility: 1.0,
    };

    /// Minimum of the three, floored at [`MIN_REDUCTION_FACTOR`].
    #[must_use]
    pub fn combined(&self) -> f64 {
        self.drawdown
            .min(self.sharpe)
            .min(self.volatility)
            .max(MIN_REDUCTION_FACTOR)
    }
}

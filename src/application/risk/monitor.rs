//! Realized-value risk monitor.
//!
//! Tracks a strategy's portfolio value over time and derives drawdown,
//! annualized volatility, Sharpe ratio, historical VaR, and a position
//! reduction factor. Peak value and maximum drawdown cover the whole
//! history; the statistics cover a rolling window of the latest snapshots.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::risk::{
    ReductionFactors, RiskLevel, RiskLimits, RiskMetrics, RiskViolation, TRADING_DAYS,
    WARNING_RATIO,
};
use crate::domain::snapshot::PortfolioSnapshot;
use crate::error::RiskError;

/// Stateful tracker of one strategy's realized value sequence.
#[derive(Debug, Clone)]
pub struct RiskMonitor {
    limits: RiskLimits,
    window: VecDeque<PortfolioSnapshot>,
    latest: Option<DateTime<Utc>>,
    peak_value: f64,
    current_drawdown: f64,
    max_drawdown: f64,
    level: RiskLevel,
}

impl RiskMonitor {
    #[must_use]
    pub fn new(limits: RiskLimits) -> Self {
        Self {
            window: VecDeque::with_capacity(limits.window),
            limits,
            latest: None,
            peak_value: 0.0,
            current_drawdown: 0.0,
            max_drawdown: 0.0,
            level: RiskLevel::Normal,
        }
    }

    /// Rebuild a monitor by replaying a stored history in order.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError`] if the history is out of order or holds an
    /// invalid value.
    pub fn restore(
        limits: RiskLimits,
        history: impl IntoIterator<Item = PortfolioSnapshot>,
    ) -> Result<Self, RiskError> {
        let mut monitor = Self::new(limits);
        for snapshot in history {
            monitor.apply(snapshot)?;
        }
        Ok(monitor)
    }

    /// Check a snapshot could be appended without changing any state.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidValue`] for a negative or non-finite value
    /// and [`RiskError::OutOfOrderSnapshot`] for a timestamp before the
    /// latest one.
    pub fn check_snapshot(&self, snapshot: &PortfolioSnapshot) -> Result<(), RiskError> {
        if !snapshot.value.is_finite() || snapshot.value < 0.0 {
            return Err(RiskError::InvalidValue {
                value: snapshot.value,
            });
        }
        if let Some(latest) = self.latest {
            if snapshot.timestamp < latest {
                return Err(RiskError::OutOfOrderSnapshot {
                    timestamp: snapshot.timestamp,
                    latest,
                });
            }
        }
        Ok(())
    }

    /// Record a realized value and return the resulting risk level.
    ///
    /// # Errors
    ///
    /// See [`check_snapshot`](Self::check_snapshot).
    pub fn update(&mut self, value: f64, timestamp: DateTime<Utc>) -> Result<RiskLevel, RiskError> {
        let previous = self.level;
        self.apply(PortfolioSnapshot::new(timestamp, value))?;

        if self.level != previous {
            match self.level {
                RiskLevel::Normal => info!(
                    drawdown = self.current_drawdown,
                    "Risk level back to normal"
                ),
                level => warn!(
                    level = %level,
                    drawdown = self.current_drawdown,
                    threshold = self.limits.max_drawdown_threshold,
                    "Risk level changed"
                ),
            }
        }
        Ok(self.level)
    }

    fn apply(&mut self, snapshot: PortfolioSnapshot) -> Result<(), RiskError> {
        self.check_snapshot(&snapshot)?;

        if snapshot.value > self.peak_value {
            self.peak_value = snapshot.value;
            self.current_drawdown = 0.0;
        } else if self.peak_value > 0.0 {
            self.current_drawdown = (self.peak_value - snapshot.value) / self.peak_value;
            self.max_drawdown = self.max_drawdown.max(self.current_drawdown);
        } else {
            self.current_drawdown = 0.0;
        }

        if self.window.len() == self.limits.window {
            self.window.pop_front();
        }
        self.window.push_back(snapshot);
        self.latest = Some(snapshot.timestamp);
        self.level = RiskLevel::classify(self.current_drawdown, self.limits.max_drawdown_threshold);
        Ok(())
    }

    #[must_use]
    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    #[must_use]
    pub fn level(&self) -> RiskLevel {
        self.level
    }

    #[must_use]
    pub fn peak_value(&self) -> f64 {
        self.peak_value
    }

    #[must_use]
    pub fn current_drawdown(&self) -> f64 {
        self.current_drawdown
    }

    #[must_use]
    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }

    /// Snapshots in the rolling window, oldest first.
    pub fn snapshots(&self) -> impl Iterator<Item = &PortfolioSnapshot> {
        self.window.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    #[must_use]
    pub fn has_sufficient_history(&self) -> bool {
        self.window.len() >= 2
    }

    /// Daily returns between consecutive snapshots in the window. Pairs whose
    /// earlier value is zero are skipped.
    #[must_use]
    pub fn daily_returns(&self) -> Vec<f64> {
        self.window
            .iter()
            .zip(self.window.iter().skip(1))
            .filter_map(|(previous, current)| current.return_since(previous))
            .collect()
    }

    /// Window statistics. Zeroed, with `sufficient_history` false, when the
    /// window holds fewer than two snapshots.
    #[must_use]
    pub fn calculate_risk_metrics(&self) -> RiskMetrics {
        let mut metrics = RiskMetrics {
            sufficient_history: self.has_sufficient_history(),
            observations: self.window.len(),
            peak_value: self.peak_value,
            current_drawdown: self.current_drawdown,
            max_drawdown: self.max_drawdown,
            ..RiskMetrics::default()
        };
        if !metrics.sufficient_history {
            return metrics;
        }

        let returns = self.daily_returns();
        if returns.is_empty() {
            return metrics;
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

        metrics.volatility = variance.sqrt() * TRADING_DAYS.sqrt();
        metrics.annualized_return = mean * TRADING_DAYS;
        metrics.sharpe_ratio = if metrics.volatility > 0.0 {
            metrics.annualized_return / metrics.volatility
        } else {
            0.0
        };
        metrics.value_at_risk = (-quantile(returns, 1.0 - self.limits.var_confidence)).max(0.0);
        metrics
    }

    /// Limits the current history breaks. Sharpe and volatility are only
    /// checked with sufficient history.
    #[must_use]
    pub fn check_risk_limits(&self) -> Vec<RiskViolation> {
        let mut violations = Vec::new();
        let metrics = self.calculate_risk_metrics();

        if self.current_drawdown > self.limits.max_drawdown_threshold {
            violations.push(RiskViolation::Drawdown {
                current: self.current_drawdown,
                threshold: self.limits.max_drawdown_threshold,
            });
        }
        if metrics.sufficient_history {
            if metrics.sharpe_ratio < self.limits.min_sharpe_ratio {
                violations.push(RiskViolation::Sharpe {
                    actual: metrics.sharpe_ratio,
                    minimum: self.limits.min_sharpe_ratio,
                });
            }
            if metrics.volatility > self.limits.max_volatility {
                violations.push(RiskViolation::Volatility {
                    actual: metrics.volatility,
                    maximum: self.limits.max_volatility,
                });
            }
        }
        violations
    }

    /// The three independent reduction factors, each in [0, 1].
    #[must_use]
    pub fn reduction_factors(&self) -> ReductionFactors {
        let threshold = self.limits.max_drawdown_threshold;
        let warning = WARNING_RATIO * threshold;
        let drawdown = if self.current_drawdown <= warning {
            1.0
        } else {
            1.0 - 0.5 * (self.current_drawdown - warning) / ((1.0 - WARNING_RATIO) * threshold)
        };

        let metrics = self.calculate_risk_metrics();
        let (sharpe, volatility) = if metrics.sufficient_history {
            let min_sharpe = self.limits.min_sharpe_ratio;
            let sharpe = if min_sharpe <= 0.0 || metrics.sharpe_ratio >= min_sharpe {
                1.0
            } else {
                0.5 + 0.5 * metrics.sharpe_ratio / min_sharpe
            };
            let volatility = if metrics.volatility <= self.limits.max_volatility {
                1.0
            } else {
                self.limits.max_volatility / metrics.volatility
            };
            (sharpe, volatility)
        } else {
            (1.0, 1.0)
        };

        ReductionFactors {
            drawdown: drawdown.clamp(0.0, 1.0),
            sharpe: sharpe.clamp(0.0, 1.0),
            volatility: volatility.clamp(0.0, 1.0),
        }
    }

    /// Combined position reduction factor in [0.10, 1.0].
    #[must_use]
    pub fn position_reduction_factor(&self) -> f64 {
        self.reduction_factors().combined()
    }
}

/// Quantile with linear interpolation between order statistics.
fn quantile(mut values: Vec<f64>, q: f64) -> f64 {
    values.sort_by(f64::total_cmp);
    let rank = q.clamp(0.0, 1.0) * (values.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    values[lower] + (values[upper] - values[lower]) * fraction
}

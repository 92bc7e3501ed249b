//! Strategy profiles.
//!
//! A [`StrategyProfile`] is the full set of risk-appetite numbers for one
//! capital pool. The three named presets are plain values; every engine
//! component is parameterized by a profile and never branches on its name.
//!
//! # Examples
//!
//! ```
//! use bankroll::domain::profile::{Preset, StrategyProfile};
//!
//! let balanced: Preset = "balanced".parse().unwrap();
//! let profile = StrategyProfile::preset(balanced);
//! assert_eq!(profile.kelly_safety_factor, 0.50);
//! assert_eq!(profile.max_total_allocation_fraction, 0.80);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Named parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Conservative,
    Balanced,
    Aggressive,
}

impl Preset {
    pub const ALL: [Self; 3] = [Self::Conservative, Self::Balanced, Self::Aggressive];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Balanced => "balanced",
            Self::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "balanced" => Ok(Self::Balanced),
            "aggressive" => Ok(Self::Aggressive),
            _ => Err(ConfigError::UnknownStrategy {
                name: s.to_string(),
            }),
        }
    }
}

/// Risk-appetite parameters for one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyProfile {
    pub name: String,
    /// Multiplier applied to the raw Kelly fraction, in (0, 1].
    pub kelly_safety_factor: f64,
    /// Cap on any single position as a fraction of capital.
    pub max_position_fraction: f64,
    /// Cap on total exposure as a fraction of capital.
    pub max_total_allocation_fraction: f64,
    /// Minimum `|edge|` for an opportunity to be considered.
    pub min_edge_threshold: f64,
    /// Minimum confidence composite for an opportunity to be considered.
    pub min_confidence_threshold: f64,
    /// Maximum number of positions per cycle.
    pub max_positions: usize,
    /// Volatility assumed for quotes that carry none.
    pub default_volatility: Option<f64>,
}

impl StrategyProfile {
    /// The parameter set for a named preset.
    #[must_use]
    pub fn preset(preset: Preset) -> Self {
        let (kelly, max_position, max_total, min_edge, min_confidence, max_positions, volatility) =
            match preset {
                Preset::Conservative => (0.25, 0.15, 0.70, 0.10, 0.7, 15, 0.10),
                Preset::Balanced => (0.50, 0.20, 0.80, 0.05, 0.5, 25, 0.15),
                Preset::Aggressive => (0.75, 0.30, 0.90, 0.03, 0.4, 25, 0.20),
            };
        Self {
            name: preset.as_str().to_string(),
            kelly_safety_factor: kelly,
            max_position_fraction: max_position,
            max_total_allocation_fraction: max_total,
            min_edge_threshold: min_edge,
            min_confidence_threshold: min_confidence,
            max_positions,
            default_volatility: Some(volatility),
        }
    }

    #[must_use]
    pub fn conservative() -> Self {
        Self::preset(Preset::Conservative)
    }

    #[must_use]
    pub fn balanced() -> Self {
        Self::preset(Preset::Balanced)
    }

    #[must_use]
    pub fn aggressive() -> Self {
        Self::preset(Preset::Aggressive)
    }

    /// Rename the profile, keeping its parameters.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Check every parameter is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "name" });
        }
        if !(self.kelly_safety_factor > 0.0 && self.kelly_safety_factor <= 1.0) {
            return Err(invalid(
                "kelly_safety_factor",
                "must be in (0, 1]",
                self.kelly_safety_factor,
            ));
        }
        if !(self.max_position_fraction > 0.0 && self.max_position_fraction <= 1.0) {
            return Err(invalid(
                "max_position_fraction",
                "must be in (0, 1]",
                self.max_position_fraction,
            ));
        }
        if !(self.max_total_allocation_fraction > 0.0 && self.max_total_allocation_fraction <= 1.0)
        {
            return Err(invalid(
                "max_total_allocation_fraction",
                "must be in (0, 1]",
                self.max_total_allocation_fraction,
            ));
        }
        if !(0.0..1.0).contains(&self.min_edge_threshold) {
            return Err(invalid(
                "min_edge_threshold",
                "must be in [0, 1)",
                self.min_edge_threshold,
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence_threshold) {
            return Err(invalid(
                "min_confidence_threshold",
                "must be in [0, 1]",
                self.min_confidence_threshold,
            ));
        }
        if self.max_positions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_positions",
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(volatility) = self.default_volatility {
            if !volatility.is_finite() || volatility < 0.0 {
                return Err(invalid(
                    "default_volatility",
                    "must be a non-negative number",
                    volatility,
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, rule: &str, value: f64) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: format!("{rule}, got {value}"),
    }
}

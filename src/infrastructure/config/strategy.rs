//! Strategy configuration.
//!
//! Each `[[strategies]]` entry names a capital pool. Its parameters start
//! from a preset (the `preset` key, or the name itself when it is a preset
//! name) and any field set in the entry overrides the preset value.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::profile::{Preset, StrategyProfile};
use crate::error::ConfigError;

/// One `[[strategies]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    /// Total capital for this strategy in currency units.
    pub capital: Decimal,
    /// Preset the overrides apply to. Defaults to the preset named `name`.
    #[serde(default)]
    pub preset: Option<Preset>,
    #[serde(default)]
    pub kelly_safety_factor: Option<f64>,
    #[serde(default)]
    pub max_position_fraction: Option<f64>,
    #[serde(default)]
    pub max_total_allocation_fraction: Option<f64>,
    #[serde(default)]
    pub min_edge_threshold: Option<f64>,
    #[serde(default)]
    pub min_confidence_threshold: Option<f64>,
    #[serde(default)]
    pub max_positions: Option<usize>,
    #[serde(default)]
    pub default_volatility: Option<f64>,
    /// Drop the preset's default volatility so quotes without one are
    /// skipped as degenerate.
    #[serde(default)]
    pub require_quote_volatility: bool,
}

impl StrategyConfig {
    /// Entry for a named preset with no overrides.
    #[must_use]
    pub fn preset(preset: Preset, capital: Decimal) -> Self {
        Self {
            name: preset.as_str().to_string(),
            capital,
            preset: Some(preset),
            kelly_safety_factor: None,
            max_position_fraction: None,
            max_total_allocation_fraction: None,
            min_edge_threshold: None,
            min_confidence_threshold: None,
            max_positions: None,
            default_volatility: None,
            require_quote_volatility: false,
        }
    }

    /// Resolve the entry into a validated profile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownStrategy`] when there is no `preset` and
    /// the name is not a preset name, or [`ConfigError::InvalidValue`] for an
    /// out-of-range parameter.
    pub fn to_profile(&self) -> Result<StrategyProfile, ConfigError> {
        let base = match self.preset {
            Some(preset) => preset,
            None => self.name.parse::<Preset>()?,
        };

        let mut profile = StrategyProfile::preset(base).named(self.name.clone());
        if let Some(v) = self.kelly_safety_factor {
            profile.kelly_safety_factor = v;
        }
        if let Some(v) = self.max_position_fraction {
            profile.max_position_fraction = v;
        }
        if let Some(v) = self.max_total_allocation_fraction {
            profile.max_total_allocation_fraction = v;
        }
        if let Some(v) = self.min_edge_threshold {
            profile.min_edge_threshold = v;
        }
        if let Some(v) = self.min_confidence_threshold {
            profile.min_confidence_threshold = v;
        }
        if let Some(v) = self.max_positions {
            profile.max_positions = v;
        }
        match (self.default_volatility, self.require_quote_volatility) {
            (Some(v), true) => {
                return Err(ConfigError::InvalidValue {
                    field: "default_volatility",
                    reason: format!("{v} conflicts with require_quote_volatility = true"),
                })
            }
            (Some(v), false) => profile.default_volatility = Some(v),
            (None, true) => profile.default_volatility = None,
            (None, false) => {}
        }

        profile.validate()?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn preset_name_resolves_without_preset_key() {
        let mut config = StrategyConfig::preset(Preset::Aggressive, dec!(100));
        config.preset = None;
        let profile = config.to_profile().unwrap();
        assert_eq!(profile, StrategyProfile::aggressive());
    }

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let mut config = StrategyConfig::preset(Preset::Balanced, dec!(50));
        config.name = "wide".to_string();
        config.max_position_fraction = Some(0.5);

        let profile = config.to_profile().unwrap();
        assert_eq!(profile.name, "wide");
        assert_eq!(profile.max_position_fraction, 0.5);
        assert_eq!(profile.kelly_safety_factor, 0.50);
    }

    #[test]
    fn unknown_name_without_preset_fails() {
        let mut config = StrategyConfig::preset(Preset::Balanced, dec!(50));
        config.name = "moonshot".to_string();
        config.preset = None;
        assert!(matches!(
            config.to_profile(),
            Err(ConfigError::UnknownStrategy { name }) if name == "moonshot"
        ));
    }

    #[test]
    fn require_quote_volatility_clears_the_default() {
        let mut config = StrategyConfig::preset(Preset::Balanced, dec!(50));
        config.require_quote_volatility = true;

        let profile = config.to_profile().unwrap();
        assert_eq!(profile.default_volatility, None);

        config.default_volatility = Some(0.3);
        assert!(matches!(
            config.to_profile(),
            Err(ConfigError::InvalidValue { field: "default_volatility", .. })
        ));
    }
}

//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings. The
//! configuration is loaded from a TOML file and validated in full before any
//! strategy session is built.
//!
//! # Example
//!
//! ```no_run
//! use bankroll::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.logging.init();
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::logging::LoggingConfig;
use super::risk::RiskConfig;
use super::scoring::ScoringConfig;
use super::strategy::StrategyConfig;
use crate::application::scoring::ScoringPolicy;
use crate::domain::profile::StrategyProfile;
use crate::domain::risk::RiskLimits;
use crate::error::{ConfigError, Result};
use crate::infrastructure::paths;

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Opportunity scoring weights and thresholds.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Risk monitor limits.
    #[serde(default)]
    pub risk: RiskConfig,

    /// Strategy capital pools. At least one is required.
    #[serde(default)]
    pub strategies: Vec<StrategyConfig>,

    /// Path to SQLite database file.
    ///
    /// Defaults to `~/.bankroll/bankroll.db`.
    #[serde(default = "default_database_path")]
    pub database: String,
}

fn default_database_path() -> String {
    paths::default_database().to_string_lossy().into_owned()
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// Checks the scoring table, the risk limits, and every strategy entry.
    fn validate(&self) -> Result<()> {
        self.scoring_policy().validate()?;
        self.risk_limits().validate()?;

        if self.strategies.is_empty() {
            return Err(ConfigError::MissingField {
                field: "strategies",
            }
            .into());
        }

        let mut names = HashSet::new();
        for strategy in &self.strategies {
            if !names.insert(strategy.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "strategies",
                    reason: format!("duplicate strategy name '{}'", strategy.name),
                }
                .into());
            }
            if strategy.capital <= Decimal::ZERO {
                return Err(ConfigError::InvalidValue {
                    field: "capital",
                    reason: format!(
                        "must be greater than 0 for strategy '{}'",
                        strategy.name
                    ),
                }
                .into());
            }
            strategy.to_profile()?;
        }

        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        Ok(())
    }

    /// Scoring policy shared by all strategies.
    #[must_use]
    pub fn scoring_policy(&self) -> ScoringPolicy {
        ScoringPolicy::from(&self.scoring)
    }

    /// Risk limits shared by all strategies.
    #[must_use]
    pub fn risk_limits(&self) -> RiskLimits {
        RiskLimits::from(&self.risk)
    }

    /// Look up a strategy entry by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownStrategy`] when no entry has that name.
    pub fn strategy(&self, name: &str) -> std::result::Result<&StrategyConfig, ConfigError> {
        self.strategies
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ConfigError::UnknownStrategy {
                name: name.to_string(),
            })
    }

    /// Every configured strategy as a resolved profile and its capital.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an entry that does not resolve.
    pub fn profiles(&self) -> std::result::Result<Vec<(StrategyProfile, Decimal)>, ConfigError> {
        self.strategies
            .iter()
            .map(|s| Ok((s.to_profile()?, s.capital)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rust_decimal_macros::dec;

    const MINIMAL: &str = r#"
        database = "bankroll.db"

        [[strategies]]
        name = "balanced"
        capital = "50"
    "#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::parse_toml(MINIMAL).unwrap();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.scoring_policy(), ScoringPolicy::default());
        assert_eq!(config.risk_limits(), RiskLimits::default());
        assert!(config.risk.apply_reduction);
        assert_eq!(config.strategies[0].capital, dec!(50));
    }

    #[test]
    fn capital_accepts_numeric_literal() {
        let config = Config::parse_toml(
            r#"
            [[strategies]]
            name = "conservative"
            capital = 1250.50
            "#,
        )
        .unwrap();
        assert_eq!(config.strategies[0].capital, dec!(1250.50));
    }

    #[test]
    fn missing_strategies_fails() {
        let result = Config::parse_toml("database = \"x.db\"");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField {
                field: "strategies"
            }))
        ));
    }

    #[test]
    fn duplicate_strategy_names_fail() {
        let toml = format!("{MINIMAL}\n[[strategies]]\nname = \"balanced\"\ncapital = \"10\"\n");
        assert!(matches!(
            Config::parse_toml(&toml),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "strategies",
                ..
            }))
        ));
    }

    #[test]
    fn profiles_resolve_overrides() {
        let config = Config::parse_toml(
            r#"
            [[strategies]]
            name = "wide"
            preset = "balanced"
            capital = "50"
            max_position_fraction = 0.5
            "#,
        )
        .unwrap();

        let profiles = config.profiles().unwrap();
        assert_eq!(profiles[0].0.name, "wide");
        assert_eq!(profiles[0].0.max_position_fraction, 0.5);
        assert_eq!(profiles[0].1, dec!(50));
        assert!(config.strategy("wide").is_ok());
        assert!(matches!(
            config.strategy("other"),
            Err(ConfigError::UnknownStrategy { .. })
        ));
    }
}

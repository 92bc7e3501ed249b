//! Handler for the `config` command group and shared config loading.

use std::fs;
use std::path::Path;

use serde_json::json;

use super::diagnostic::{self, CommandError};
use super::output;
use crate::error::ConfigError;
use crate::infrastructure::config::settings::Config;

/// Default config template with documentation.
pub const CONFIG_TEMPLATE: &str = include_str!("../../../../config.toml.example");

/// Load and validate a config file, then start logging at its level.
///
/// Failures are rendered against the file content.
pub fn load(path: &Path) -> miette::Result<Config> {
    let content = fs::read_to_string(path)
        .map_err(|e| diagnostic::config_report(ConfigError::ReadFile(e).into(), path, ""))?;
    let config =
        Config::parse_toml(&content).map_err(|e| diagnostic::config_report(e, path, &content))?;

    let mut logging = config.logging.clone();
    match output::verbosity() {
        0 => {}
        1 => logging.level = "debug".to_string(),
        _ => logging.level = "trace".to_string(),
    }
    logging.init();

    Ok(config)
}

/// Execute `config init`.
pub fn execute_init(path: &Path, force: bool) -> miette::Result<()> {
    if path.exists() && !force {
        return Err(CommandError::new(format!("{} already exists", path.display()))
            .with_help("use --force to overwrite")
            .into());
    }

    let written = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::write(path, CONFIG_TEMPLATE));
    if let Err(e) = written {
        return Err(CommandError::new(format!("failed to write {}: {e}", path.display())).into());
    }

    if output::is_json() {
        output::json_output(&json!({
            "command": "config.init",
            "path": path.display().to_string(),
        }));
        return Ok(());
    }

    output::section("Config Initialized");
    output::success("Created configuration file");
    output::field("Path", path.display());
    output::section("Next Steps");
    output::note(&format!("1. Edit {} with your strategies", path.display()));
    output::note(&format!(
        "2. Run: bankroll check config -c {}",
        path.display()
    ));
    output::note(&format!(
        "3. Run: bankroll allocate -c {} --batch forecasts.json",
        path.display()
    ));
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(path: &Path) -> miette::Result<()> {
    let config = load(path)?;
    let profiles = config
        .profiles()
        .map_err(|e| diagnostic::command_report(e.into()))?;
    let scoring = config.scoring_policy();
    let limits = config.risk_limits();

    if output::is_json() {
        let strategies: Vec<_> = profiles
            .iter()
            .map(|(profile, capital)| json!({ "profile": profile, "capital": capital }))
            .collect();
        output::json_output(&json!({
            "command": "config.show",
            "database": config.database,
            "logging": { "level": config.logging.level, "format": config.logging.format },
            "scoring": scoring,
            "risk": limits,
            "apply_reduction": config.risk.apply_reduction,
            "strategies": strategies,
        }));
        return Ok(());
    }

    output::section("Effective Configuration");
    output::field("Database", &config.database);
    output::field(
        "Logging",
        format!("{} ({})", config.logging.level, config.logging.format),
    );

    output::section("Scoring");
    output::field("Reference liq.", scoring.reference_liquidity);
    output::field("Min score", scoring.min_opportunity_score);
    output::field("Weights", format_weights(&scoring));

    output::section("Risk");
    output::field("Max drawdown", output::percent(limits.max_drawdown_threshold));
    output::field("Min Sharpe", limits.min_sharpe_ratio);
    output::field("Max volatility", output::percent(limits.max_volatility));
    output::field("VaR confidence", output::percent(limits.var_confidence));
    output::field("Window", limits.window);
    output::field("Reduction", config.risk.apply_reduction);

    output::section("Strategies");
    for (profile, capital) in &profiles {
        output::field(&profile.name, format!("${capital}"));
    }
    Ok(())
}

fn format_weights(policy: &crate::application::scoring::ScoringPolicy) -> String {
    let w = &policy.weights;
    format!(
        "source {:.2} / recency {:.2} / consensus {:.2} / base rate {:.2} / reasoning {:.2}",
        w.source_quality,
        w.information_recency,
        w.consensus,
        w.base_rate_alignment,
        w.reasoning_clarity
    )
}

//! Strategy profile listing.

use std::path::Path;

use rust_decimal::Decimal;
use serde_json::json;
use tabled::Tabled;

use super::{config, diagnostic, output};
use crate::domain::profile::{Preset, StrategyProfile};

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Capital")]
    capital: String,
    #[tabled(rename = "Kelly")]
    kelly: String,
    #[tabled(rename = "Max Pos")]
    max_position: String,
    #[tabled(rename = "Max Total")]
    max_total: String,
    #[tabled(rename = "Min Edge")]
    min_edge: String,
    #[tabled(rename = "Min Conf")]
    min_confidence: String,
    #[tabled(rename = "Positions")]
    max_positions: usize,
}

impl ProfileRow {
    fn new(profile: &StrategyProfile, capital: Option<Decimal>) -> Self {
        Self {
            name: profile.name.clone(),
            capital: capital.map_or_else(|| "-".to_string(), |c| format!("${c}")),
            kelly: format!("{:.2}", profile.kelly_safety_factor),
            max_position: output::percent(profile.max_position_fraction),
            max_total: output::percent(profile.max_total_allocation_fraction),
            min_edge: output::percent(profile.min_edge_threshold),
            min_confidence: format!("{:.2}", profile.min_confidence_threshold),
            max_positions: profile.max_positions,
        }
    }
}

/// List the built-in presets, or the strategies a config file resolves to.
pub fn list(config_path: Option<&Path>) -> miette::Result<()> {
    let entries: Vec<(StrategyProfile, Option<Decimal>)> = match config_path {
        Some(path) => config::load(path)?
            .profiles()
            .map_err(|e| diagnostic::command_report(e.into()))?
            .into_iter()
            .map(|(profile, capital)| (profile, Some(capital)))
            .collect(),
        None => Preset::ALL
            .iter()
            .map(|preset| (StrategyProfile::preset(*preset), None))
            .collect(),
    };

    if output::is_json() {
        let profiles: Vec<_> = entries
            .iter()
            .map(|(profile, capital)| json!({ "profile": profile, "capital": capital }))
            .collect();
        output::json_output(&json!({
            "command": "profiles",
            "profiles": profiles,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section(if config_path.is_some() {
        "Configured strategies"
    } else {
        "Preset profiles"
    });
    output::table(
        entries
            .iter()
            .map(|(profile, capital)| ProfileRow::new(profile, *capital)),
    );
    if config_path.is_none() {
        output::hint(&format!(
            "reference a preset from {} with `preset = \"balanced\"`",
            output::highlight("[[strategies]]")
        ));
    }
    Ok(())
}

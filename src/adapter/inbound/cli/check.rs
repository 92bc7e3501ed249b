//! Configuration and storage validation commands.

use std::path::Path;

use serde_json::json;

use super::{config, diagnostic, output};
use crate::infrastructure::bootstrap;
use crate::port::outbound::snapshot::SnapshotStore;

/// Validate the configuration file without running anything.
pub fn execute_config(path: &Path) -> miette::Result<()> {
    let config = config::load(path)?;
    let profiles = config
        .profiles()
        .map_err(|e| diagnostic::command_report(e.into()))?;

    if output::is_json() {
        output::json_output(&json!({
            "command": "check.config",
            "valid": true,
            "strategies": profiles.iter().map(|(p, _)| p.name.as_str()).collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    output::section("Checking configuration");
    output::field("Path", path.display());
    output::success("Configuration file is valid");
    for (profile, capital) in &profiles {
        output::field(&profile.name, format!("${capital}"));
    }
    if !config.risk.apply_reduction {
        output::warning("risk-based position reduction is disabled");
    }
    Ok(())
}

/// Open the database, run migrations, and replay every stored history.
pub fn execute_database(path: &Path) -> miette::Result<()> {
    let config = config::load(path)?;
    let store = bootstrap::open_store(&config).map_err(diagnostic::command_report)?;
    let sessions = bootstrap::restore_sessions(&config, None, &store)
        .map_err(diagnostic::command_report)?;
    let stored = store.strategies().map_err(diagnostic::command_report)?;
    let orphaned: Vec<&String> = stored
        .iter()
        .filter(|name| config.strategy(name).is_err())
        .collect();

    if output::is_json() {
        let histories: Vec<_> = sessions
            .iter()
            .map(|s| json!({ "strategy": s.name(), "snapshots": s.monitor().len() }))
            .collect();
        output::json_output(&json!({
            "command": "check.database",
            "database": config.database,
            "histories": histories,
            "orphaned": orphaned,
        }));
        return Ok(());
    }

    output::section("Checking database");
    output::field("Path", &config.database);
    output::success("Migrations applied");
    for session in &sessions {
        output::field(
            session.name(),
            format!("{} snapshots in window", session.monitor().len()),
        );
    }
    for name in orphaned {
        output::warning(&format!(
            "history for '{name}' has no matching [[strategies]] entry"
        ));
    }
    Ok(())
}

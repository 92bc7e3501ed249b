//! Handler for `bankroll record`.

use chrono::Utc;
use serde_json::json;

use super::command::RecordArgs;
use super::{config, diagnostic, output};
use crate::domain::risk::RiskLevel;
use crate::infrastructure::bootstrap;

/// Execute `record`: persist one realized value and report the new level.
pub fn execute(args: &RecordArgs) -> miette::Result<()> {
    let config = config::load(&args.config)?;
    let store = bootstrap::open_store(&config).map_err(diagnostic::command_report)?;
    let mut sessions = bootstrap::restore_sessions(&config, Some(&args.strategy), &store)
        .map_err(diagnostic::command_report)?;
    let Some(session) = sessions.first_mut() else {
        return Ok(());
    };

    let timestamp = args.at.unwrap_or_else(Utc::now);
    let level = session
        .record_value(args.value, timestamp, &store)
        .map_err(diagnostic::command_report)?;
    let monitor = session.monitor();

    if output::is_json() {
        output::json_output(&json!({
            "command": "record",
            "strategy": session.name(),
            "timestamp": timestamp,
            "value": args.value,
            "level": level,
            "peak_value": monitor.peak_value(),
            "current_drawdown": monitor.current_drawdown(),
            "reduction_factor": session.reduction_factor(),
        }));
        return Ok(());
    }

    output::section(&format!("Recorded {}", session.name()));
    output::field("Value", output::money(args.value));
    output::field("At", timestamp.to_rfc3339());
    output::field("Peak", output::money(monitor.peak_value()));
    output::field("Drawdown", output::percent(monitor.current_drawdown()));
    match level {
        RiskLevel::Normal => output::success("Risk level NORMAL"),
        RiskLevel::Warning => output::warning("Risk level WARNING: drawdown nearing the limit"),
        RiskLevel::Breach => output::error("Risk level BREACH: drawdown exceeds the limit"),
    }
    Ok(())
}

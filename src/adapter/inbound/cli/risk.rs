//! Handler for `bankroll risk`.

use serde_json::json;
use tabled::Tabled;

use super::command::RiskArgs;
use super::{config, diagnostic, output};
use crate::application::session::StrategySession;
use crate::domain::risk::RiskLevel;
use crate::infrastructure::bootstrap;

#[derive(Tabled)]
struct RiskRow {
    #[tabled(rename = "Strategy")]
    strategy: String,
    #[tabled(rename = "Level")]
    level: RiskLevel,
    #[tabled(rename = "Obs")]
    observations: usize,
    #[tabled(rename = "Drawdown")]
    drawdown: String,
    #[tabled(rename = "Max DD")]
    max_drawdown: String,
    #[tabled(rename = "Volatility")]
    volatility: String,
    #[tabled(rename = "Sharpe")]
    sharpe: String,
    #[tabled(rename = "VaR")]
    value_at_risk: String,
    #[tabled(rename = "Reduction")]
    reduction: String,
}

impl RiskRow {
    fn new(session: &StrategySession) -> Self {
        let monitor = session.monitor();
        let metrics = monitor.calculate_risk_metrics();
        let dash = || "-".to_string();
        Self {
            strategy: session.name().to_string(),
            level: monitor.level(),
            observations: metrics.observations,
            drawdown: output::percent(metrics.current_drawdown),
            max_drawdown: output::percent(metrics.max_drawdown),
            volatility: if metrics.sufficient_history {
                output::percent(metrics.volatility)
            } else {
                dash()
            },
            sharpe: if metrics.sufficient_history {
                format!("{:.2}", metrics.sharpe_ratio)
            } else {
                dash()
            },
            value_at_risk: if metrics.sufficient_history {
                output::percent(metrics.value_at_risk)
            } else {
                dash()
            },
            reduction: format!("x{:.2}", session.reduction_factor()),
        }
    }
}

/// Execute `risk`: restore histories and report metrics per strategy.
pub fn execute(args: &RiskArgs) -> miette::Result<()> {
    let config = config::load(&args.config)?;
    let store = bootstrap::open_store(&config).map_err(diagnostic::command_report)?;
    let sessions = bootstrap::restore_sessions(&config, args.strategy.as_deref(), &store)
        .map_err(diagnostic::command_report)?;

    if output::is_json() {
        let strategies: Vec<_> = sessions
            .iter()
            .map(|session| {
                let monitor = session.monitor();
                json!({
                    "strategy": session.name(),
                    "level": monitor.level(),
                    "metrics": monitor.calculate_risk_metrics(),
                    "violations": monitor.check_risk_limits(),
                    "reduction_factors": monitor.reduction_factors(),
                    "reduction_factor": session.reduction_factor(),
                    "counters": session.counters(),
                })
            })
            .collect();
        output::json_output(&json!({
            "command": "risk",
            "limits": config.risk_limits(),
            "strategies": strategies,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Risk");
    output::table(sessions.iter().map(RiskRow::new));

    for session in &sessions {
        for violation in session.monitor().check_risk_limits() {
            output::warning(&format!("{}: {violation}", session.name()));
        }
        if session.monitor().len() < 2 {
            output::note(&format!(
                "{}: fewer than two snapshots, only drawdown is tracked",
                session.name()
            ));
        }
    }
    output::hint(&format!(
        "record values with {}",
        output::highlight("bankroll record --strategy <name> --value <amount>")
    ));
    Ok(())
}

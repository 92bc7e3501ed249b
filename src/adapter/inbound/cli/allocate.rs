//! Handler for `bankroll allocate`.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tabled::Tabled;
use tracing::info;

use super::command::AllocateArgs;
use super::diagnostic::{self, CommandError};
use super::{config, output};
use crate::application::engine::CycleReport;
use crate::application::session::{self, StrategySession};
use crate::domain::forecast::ForecastBatch;
use crate::error::{Error, Result};
use crate::infrastructure::bootstrap;

#[derive(Tabled)]
struct PositionRow {
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Side")]
    side: &'static str,
    #[tabled(rename = "Stake")]
    stake: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Edge")]
    edge: String,
    #[tabled(rename = "Conf")]
    confidence: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Call")]
    recommendation: String,
}

/// Read a batch document from a file, or from stdin for `-`.
fn read_batch(path: &Path) -> Result<ForecastBatch> {
    let json = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(path)?
    };
    ForecastBatch::from_json(&json)
}

/// Execute `allocate`.
pub async fn execute(args: &AllocateArgs) -> miette::Result<()> {
    let config = config::load(&args.config)?;
    let batch = read_batch(&args.batch).map_err(|e| {
        CommandError::new(format!(
            "failed to read batch {}: {e}",
            args.batch.display()
        ))
        .with_help(match e {
            Error::Json(_) => "the batch must be a JSON document with an `entries` array",
            _ => "pass --batch <file> or --batch - to read stdin",
        })
    })?;

    let sessions = if args.no_reduction {
        bootstrap::build_sessions(&config, args.strategy.as_deref())
    } else {
        bootstrap::open_store(&config).and_then(|store| {
            bootstrap::restore_sessions(&config, args.strategy.as_deref(), &store)
        })
    }
    .map_err(diagnostic::command_report)?;

    info!(
        strategies = sessions.len(),
        entries = batch.len(),
        "Running allocation cycle"
    );
    let results = session::run_all(sessions, Arc::new(batch))
        .await
        .map_err(diagnostic::command_report)?;

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if output::is_json() {
        print_json(&results);
    } else {
        output::header(env!("CARGO_PKG_VERSION"));
        for (session, report) in &results {
            match report {
                Ok(report) => print_report(session, report),
                Err(e) => output::error(&format!("{}: {e}", session.name())),
            }
        }
    }

    if failed > 0 {
        return Err(CommandError::new(format!(
            "{failed} of {} strategies failed the cycle",
            results.len()
        ))
        .into());
    }
    Ok(())
}

fn print_json(results: &[(StrategySession, Result<CycleReport>)]) {
    let entries: Vec<_> = results
        .iter()
        .map(|(session, report)| match report {
            Ok(report) => json!({
                "strategy": session.name(),
                "report": report,
                "stakes": report.allocation.stakes(),
            }),
            Err(e) => json!({
                "strategy": session.name(),
                "error": e.to_string(),
            }),
        })
        .collect();
    output::json_output(&json!({
        "command": "allocate",
        "results": entries,
    }));
}

fn print_report(session: &StrategySession, report: &CycleReport) {
    let allocation = &report.allocation;
    output::section(&format!("{} ({})", session.name(), output::muted(&report.cycle_id)));
    output::field("Capital", format!("${}", session.capital()));
    output::field("Allocated", output::money(allocation.allocated()));
    output::field("Unallocated", output::money(allocation.unallocated_capital()));
    if report.reduction_factor < 1.0 {
        output::field(
            "Risk reduction",
            output::negative(format!("x{:.2}", report.reduction_factor)),
        );
    }

    let rows: Vec<PositionRow> = allocation
        .stakes()
        .into_iter()
        .filter_map(|stake| {
            let opportunity = report
                .opportunities
                .iter()
                .find(|o| o.market_id() == &stake.market_id)?;
            Some(PositionRow {
                market: stake.market_id.to_string(),
                side: stake.direction.outcome(),
                stake: format!("${}", stake.amount),
                price: format!("{:.3}", opportunity.price()),
                edge: format!("{:+.3}", opportunity.edge()),
                confidence: format!("{:.2}", opportunity.confidence()),
                score: format!("{:.4}", opportunity.score()),
                recommendation: opportunity.recommendation(),
            })
        })
        .collect();

    if rows.is_empty() {
        output::note("No positions this cycle");
    } else {
        println!();
        output::table(rows);
    }

    let metrics = &report.metrics;
    output::section("Portfolio");
    let ev = output::money(metrics.expected_value);
    output::field(
        "Expected value",
        if metrics.expected_value >= 0.0 {
            output::positive(ev)
        } else {
            output::negative(ev)
        },
    );
    output::field("Std deviation", output::money(metrics.standard_deviation()));
    output::field("Sharpe-like", format!("{:.3}", metrics.sharpe_like));
    output::field("Concentration", format!("{:.4}", metrics.concentration));
    output::field("Largest weight", output::percent(metrics.max_position_weight));

    let adjustments = &report.adjustments;
    if !adjustments.clamped.is_empty() {
        output::note(&format!(
            "{} position(s) clamped to the per-market cap",
            adjustments.clamped.len()
        ));
    }
    if adjustments.was_scaled() {
        output::note(&format!(
            "positions scaled by {:.3} to respect the total cap",
            adjustments.scale_factor
        ));
    }

    if !report.skipped.is_empty() {
        output::section(&format!("Skipped ({})", report.skipped.len()));
        for skipped in &report.skipped {
            let line = format!("{}: {}", skipped.market_id, skipped.reason);
            if skipped.reason.is_degenerate() {
                output::warning(&line);
            } else {
                output::note(&line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_batch_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        fs::write(
            &path,
            r#"{
                "entries": [{
                    "quote": { "market_id": "m", "price": 0.4, "liquidity": 20000.0 },
                    "forecast": {
                        "market_id": "m",
                        "probability": 0.6,
                        "factors": {
                            "source_quality": 0.8,
                            "information_recency": 0.8,
                            "consensus": 0.8,
                            "base_rate_alignment": 0.8,
                            "reasoning_clarity": 0.8
                        }
                    }
                }],
                "research": { "calls": 3, "cost": 0.12 }
            }"#,
        )
        .unwrap();

        let batch = read_batch(&path).unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.research.calls, 3);
    }

    #[test]
    fn malformed_batch_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        fs::write(&path, "{ \"entries\": 5 }").unwrap();

        assert!(matches!(read_batch(&path), Err(Error::Json(_))));
    }
}

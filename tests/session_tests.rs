//! Independent strategy sessions evaluated side by side.

use std::sync::Arc;

use bankroll::application::scoring::ScoringPolicy;
use bankroll::application::session::{run_all, StrategySession};
use bankroll::domain::{MarketId, Preset, RiskLimits, StrategyProfile};
use bankroll::testkit::domain::{batch, entry};
use rust_decimal_macros::dec;

fn sessions() -> Vec<StrategySession> {
    Preset::ALL
        .iter()
        .map(|preset| {
            StrategySession::new(
                StrategyProfile::preset(*preset),
                ScoringPolicy::default(),
                RiskLimits::default(),
                dec!(50),
                true,
            )
            .unwrap()
        })
        .collect()
}

#[tokio::test]
async fn every_profile_runs_on_the_same_batch() {
    let forecasts = Arc::new(batch(vec![
        entry("a", 0.40, 0.60, 0.8),
        entry("b", 0.75, 0.60, 0.8),
        entry("c", 0.50, 0.54, 0.9),
    ]));

    let results = run_all(sessions(), Arc::clone(&forecasts)).await.unwrap();

    let names: Vec<&str> = results.iter().map(|(s, _)| s.name()).collect();
    assert_eq!(names, ["conservative", "balanced", "aggressive"]);

    let amount = |index: usize, id: &str| {
        results[index]
            .1
            .as_ref()
            .unwrap()
            .allocation
            .get(&MarketId::from(id))
            .unwrap_or(0.0)
            .abs()
    };
    // higher risk appetite never stakes less on the same market
    assert!(amount(0, "a") <= amount(1, "a"));
    assert!(amount(1, "a") <= amount(2, "a"));
    // edge 0.04 clears only the aggressive threshold
    assert_eq!(amount(1, "c"), 0.0);
    assert!(amount(2, "c") > 0.0);

    for (session, report) in &results {
        assert!(report.is_ok());
        assert_eq!(session.counters().cycles, 1);
        assert_eq!(session.counters().opportunities_evaluated, 3);
    }
}

#[tokio::test]
async fn concurrent_run_matches_sequential_run() {
    let forecasts = Arc::new(batch(vec![
        entry("a", 0.40, 0.60, 0.8),
        entry("b", 0.20, 0.35, 0.7),
    ]));

    let concurrent = run_all(sessions(), Arc::clone(&forecasts)).await.unwrap();

    for ((_, report), mut session) in concurrent.iter().zip(sessions()) {
        let expected = session.run_cycle(&forecasts).unwrap();
        let actual = report.as_ref().unwrap();
        assert_eq!(actual.allocation, expected.allocation);
        assert_eq!(actual.metrics, expected.metrics);
    }
}

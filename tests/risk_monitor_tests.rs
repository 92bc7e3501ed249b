//! Risk monitor behavior over realized value sequences, including
//! persistence and restore through the SQLite store.

use bankroll::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
use bankroll::adapter::outbound::sqlite::SqliteSnapshotStore;
use bankroll::application::risk::RiskMonitor;
use bankroll::application::scoring::ScoringPolicy;
use bankroll::application::session::StrategySession;
use bankroll::domain::risk::MIN_REDUCTION_FACTOR;
use bankroll::domain::{RiskLevel, RiskLimits, RiskViolation, StrategyProfile};
use bankroll::error::{Error, RiskError};
use bankroll::port::outbound::snapshot::SnapshotStore;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 16, 0, 0).unwrap() + Duration::days(n)
}

fn monitor_with(values: &[f64]) -> RiskMonitor {
    let mut monitor = RiskMonitor::new(RiskLimits::default());
    for (i, value) in values.iter().enumerate() {
        monitor.update(*value, day(i as i64)).unwrap();
    }
    monitor
}

fn sqlite_store(dir: &tempfile::TempDir) -> SqliteSnapshotStore {
    let path = dir.path().join("snapshots.db");
    let pool = create_pool(&path.display().to_string()).unwrap();
    run_migrations(&pool).unwrap();
    SqliteSnapshotStore::new(pool)
}

#[test]
fn drawdown_follows_peak() {
    let monitor = monitor_with(&[100.0, 110.0, 90.0, 95.0]);

    assert_eq!(monitor.peak_value(), 110.0);
    assert!((monitor.current_drawdown() - 0.1364).abs() < 1e-4);
    assert!((monitor.max_drawdown() - 0.1818).abs() < 1e-4);
}

#[test]
fn levels_escalate_with_drawdown() {
    let mut monitor = RiskMonitor::new(RiskLimits::default());

    assert_eq!(monitor.update(100.0, day(0)).unwrap(), RiskLevel::Normal);
    // 17% drawdown is past 80% of the 20% limit
    assert_eq!(monitor.update(83.0, day(1)).unwrap(), RiskLevel::Warning);
    assert_eq!(monitor.update(75.0, day(2)).unwrap(), RiskLevel::Breach);
    assert_eq!(monitor.update(101.0, day(3)).unwrap(), RiskLevel::Normal);
}

#[test]
fn breach_reports_drawdown_violation() {
    let monitor = monitor_with(&[100.0, 70.0]);

    let violations = monitor.check_risk_limits();

    assert!(violations
        .iter()
        .any(|v| matches!(v, RiskViolation::Drawdown { .. })));
    assert!(monitor.position_reduction_factor() >= MIN_REDUCTION_FACTOR);
    assert!(monitor.position_reduction_factor() < 1.0);
}

#[test]
fn steady_growth_needs_no_reduction() {
    let mut value = 100.0;
    let values: Vec<f64> = (0..30)
        .map(|i| {
            value *= if i % 2 == 0 { 1.002 } else { 1.001 };
            value
        })
        .collect();
    let monitor = monitor_with(&values);

    let metrics = monitor.calculate_risk_metrics();

    assert!(metrics.sufficient_history);
    assert_eq!(metrics.current_drawdown, 0.0);
    assert_eq!(metrics.value_at_risk, 0.0);
    assert!(monitor.check_risk_limits().is_empty());
    assert_eq!(monitor.position_reduction_factor(), 1.0);
}

#[test]
fn single_snapshot_tracks_drawdown_only() {
    let monitor = monitor_with(&[100.0]);
    let metrics = monitor.calculate_risk_metrics();

    assert!(!metrics.sufficient_history);
    assert_eq!(metrics.volatility, 0.0);
    assert_eq!(metrics.sharpe_ratio, 0.0);
    assert_eq!(metrics.peak_value, 100.0);
}

#[test]
fn out_of_order_snapshot_is_rejected() {
    let mut monitor = monitor_with(&[100.0, 101.0]);

    let result = monitor.update(99.0, day(0));

    assert!(matches!(result, Err(RiskError::OutOfOrderSnapshot { .. })));
    assert_eq!(monitor.len(), 2);
}

#[test]
fn session_history_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let values = [100.0, 110.0, 90.0, 95.0];

    let first_drawdown = {
        let store = sqlite_store(&dir);
        let mut session = StrategySession::new(
            StrategyProfile::balanced(),
            ScoringPolicy::default(),
            RiskLimits::default(),
            dec!(100),
            true,
        )
        .unwrap();
        for (i, value) in values.iter().enumerate() {
            session.record_value(*value, day(i as i64), &store).unwrap();
        }
        session.monitor().max_drawdown()
    };

    let store = sqlite_store(&dir);
    let mut restored = StrategySession::new(
        StrategyProfile::balanced(),
        ScoringPolicy::default(),
        RiskLimits::default(),
        dec!(100),
        true,
    )
    .unwrap();

    assert_eq!(restored.restore(&store).unwrap(), values.len());
    assert_eq!(restored.monitor().peak_value(), 110.0);
    assert!((restored.monitor().max_drawdown() - first_drawdown).abs() < 1e-12);
    assert_eq!(store.strategies().unwrap(), vec!["balanced".to_string()]);

    let late = restored.record_value(96.0, day(1), &store);
    assert!(matches!(
        late,
        Err(Error::Risk(RiskError::OutOfOrderSnapshot { .. }))
    ));
    assert_eq!(store.load("balanced").unwrap().len(), values.len());
}

#[test]
fn histories_are_kept_per_strategy() {
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(&dir);

    let mut sessions: Vec<StrategySession> = [StrategyProfile::conservative(), StrategyProfile::aggressive()]
        .into_iter()
        .map(|profile| {
            StrategySession::new(
                profile,
                ScoringPolicy::default(),
                RiskLimits::default(),
                dec!(50),
                true,
            )
            .unwrap()
        })
        .collect();

    sessions[0].record_value(50.0, day(0), &store).unwrap();
    sessions[1].record_value(50.0, day(0), &store).unwrap();
    sessions[1].record_value(30.0, day(1), &store).unwrap();

    assert_eq!(store.load("conservative").unwrap().len(), 1);
    assert_eq!(store.load("aggressive").unwrap().len(), 2);
    assert_eq!(sessions[0].reduction_factor(), 1.0);
    assert!(sessions[1].reduction_factor() < 1.0);
}

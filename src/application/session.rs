//! Per-strategy session context.
//!
//! A [`StrategySession`] owns everything one strategy needs across cycles:
//! its capital, its engine, its [`RiskMonitor`], and its counters. Sessions
//! share no mutable state, so several can run side by side.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, instrument};

use super::engine::{AllocationEngine, CycleReport};
use super::risk::RiskMonitor;
use super::scoring::ScoringPolicy;
use crate::domain::forecast::ForecastBatch;
use crate::domain::profile::StrategyProfile;
use crate::domain::risk::{RiskLevel, RiskLimits};
use crate::domain::snapshot::PortfolioSnapshot;
use crate::error::{ConfigError, Error, Result};
use crate::port::outbound::snapshot::SnapshotStore;

/// Running totals for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionCounters {
    pub cycles: u64,
    pub opportunities_evaluated: u64,
    pub positions_opened: u64,
    pub opportunities_skipped: u64,
    pub research_calls: u64,
    pub research_cost: f64,
    pub snapshots_recorded: u64,
}

/// One strategy's capital pool and cross-cycle state.
#[derive(Debug, Clone)]
pub struct StrategySession {
    capital: Decimal,
    total_capital: f64,
    engine: AllocationEngine,
    monitor: RiskMonitor,
    apply_reduction: bool,
    counters: SessionCounters,
}

impl StrategySession {
    /// Build a session. Fails before any capital is touched if the profile,
    /// policy, limits, or capital are invalid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] wrapped in the crate error.
    pub fn new(
        profile: StrategyProfile,
        policy: ScoringPolicy,
        limits: RiskLimits,
        capital: Decimal,
        apply_reduction: bool,
    ) -> Result<Self> {
        limits.validate()?;
        let total_capital = capital
            .to_f64()
            .filter(|c| *c > 0.0 && c.is_finite())
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "capital",
                reason: format!("must be positive, got {capital}"),
            })?;

        Ok(Self {
            capital,
            total_capital,
            engine: AllocationEngine::new(profile, policy)?,
            monitor: RiskMonitor::new(limits),
            apply_reduction,
            counters: SessionCounters::default(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.engine.profile().name
    }

    #[must_use]
    pub fn profile(&self) -> &StrategyProfile {
        self.engine.profile()
    }

    #[must_use]
    pub fn capital(&self) -> Decimal {
        self.capital
    }

    #[must_use]
    pub fn monitor(&self) -> &RiskMonitor {
        &self.monitor
    }

    #[must_use]
    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    /// Reduction factor the next cycle will use.
    #[must_use]
    pub fn reduction_factor(&self) -> f64 {
        if self.apply_reduction {
            self.monitor.position_reduction_factor()
        } else {
            1.0
        }
    }

    /// Run one allocation cycle and update the counters.
    ///
    /// # Errors
    ///
    /// Returns an allocation error if the cycle breaks an invariant; the
    /// counters are left untouched in that case.
    pub fn run_cycle(&mut self, batch: &ForecastBatch) -> Result<CycleReport> {
        let report =
            self.engine
                .run_with_reduction(batch, self.total_capital, self.reduction_factor())?;

        self.counters.cycles += 1;
        self.counters.opportunities_evaluated += batch.len() as u64;
        self.counters.positions_opened += report.allocation.len() as u64;
        self.counters.opportunities_skipped += report.skipped.len() as u64;
        self.counters.research_calls += u64::from(batch.research.calls);
        self.counters.research_cost += batch.research.cost;

        Ok(report)
    }

    /// Persist a realized portfolio value, then feed it to the monitor.
    ///
    /// # Errors
    ///
    /// Returns a risk error for an invalid or out-of-order snapshot (nothing
    /// is persisted), or a store error if persistence fails.
    #[instrument(skip(self, store), fields(strategy = %self.name()))]
    pub fn record_value(
        &mut self,
        value: f64,
        timestamp: DateTime<Utc>,
        store: &impl SnapshotStore,
    ) -> Result<RiskLevel> {
        let snapshot = PortfolioSnapshot::new(timestamp, value);
        self.monitor.check_snapshot(&snapshot)?;
        store.append(self.name(), &snapshot)?;
        let level = self.monitor.update(value, timestamp)?;
        self.counters.snapshots_recorded += 1;
        Ok(level)
    }

    /// Replace the monitor with one rebuilt from stored history.
    ///
    /// Returns the number of snapshots replayed.
    ///
    /// # Errors
    ///
    /// Returns a store error, or a risk error for a corrupt history.
    pub fn restore(&mut self, store: &impl SnapshotStore) -> Result<usize> {
        let history = store.load(self.name())?;
        let count = history.len();
        self.monitor = RiskMonitor::restore(*self.monitor.limits(), history)?;
        info!(
            strategy = %self.name(),
            snapshots = count,
            peak = self.monitor.peak_value(),
            drawdown = self.monitor.current_drawdown(),
            "Restored risk history"
        );
        Ok(count)
    }
}

/// Run one cycle for each session on the blocking pool, in parallel.
///
/// Sessions own their state, so no coordination is needed. Results come
/// back in the order the sessions were given.
///
/// # Errors
///
/// Returns [`Error::Task`] if a worker panics or is cancelled. Per-session
/// cycle failures are returned alongside their session.
pub async fn run_all(
    sessions: Vec<StrategySession>,
    batch: Arc<ForecastBatch>,
) -> Result<Vec<(StrategySession, Result<CycleReport>)>> {
    let mut tasks = JoinSet::new();
    for (index, mut session) in sessions.into_iter().enumerate() {
        let batch = Arc::clone(&batch);
        tasks.spawn_blocking(move || {
            let report = session.run_cycle(&batch);
            (index, session, report)
        });
    }

    let mut results = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.map_err(|e| Error::Task(e.to_string()))?);
    }
    results.sort_by_key(|(index, _, _)| *index);

    Ok(results
        .into_iter()
        .map(|(_, session, report)| (session, report))
        .collect())
}

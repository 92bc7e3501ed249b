//! Bankroll - Kelly-based capital allocation and risk monitoring for
//! prediction market forecasts.
//!
//! Each cycle takes a batch of market quotes paired with probability
//! forecasts, scores the actionable opportunities, sizes them with a
//! fractional Kelly criterion, enforces per-market and portfolio caps, and
//! reports the resulting allocation with informational portfolio metrics.
//! Realized portfolio values feed a rolling risk monitor whose drawdown,
//! Sharpe, and volatility readings shrink future position sizes.
//!
//! # Architecture
//!
//! - **`domain`** - Value objects and invariants: quotes, forecasts,
//!   opportunities, allocations, profiles, risk limits.
//! - **`application`** - The allocation pipeline (scoring, sizing, limits,
//!   metrics), the risk monitor, and per-strategy sessions.
//! - **`port`** - Outbound seams, currently snapshot persistence.
//! - **`adapter`** - The CLI, plus in-memory and SQLite snapshot stores.
//! - **`infrastructure`** - TOML configuration, paths, and wiring.
//!
//! # Example
//!
//! ```
//! use bankroll::application::engine::AllocationEngine;
//! use bankroll::application::scoring::ScoringPolicy;
//! use bankroll::domain::{
//!     ConfidenceFactors, ForecastBatch, ForecastEntry, ForecastEstimate, MarketQuote,
//!     StrategyProfile,
//! };
//!
//! let engine = AllocationEngine::new(StrategyProfile::balanced(), ScoringPolicy::default())?;
//! let batch = ForecastBatch::new(vec![ForecastEntry::new(
//!     MarketQuote::new("m1", 0.40, Some(20_000.0)),
//!     ForecastEstimate::new("m1", 0.60, ConfidenceFactors::new(0.8, 0.8, 0.8, 0.8, 0.8)),
//! )]);
//!
//! let report = engine.run(&batch, 50.0)?;
//! assert_eq!(report.allocation.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

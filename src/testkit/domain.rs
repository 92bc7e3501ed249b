//! Builders for domain primitives used across tests.
//!
//! Provides concise factory functions for [`ForecastEntry`], [`ForecastBatch`],
//! and [`Opportunity`] so tests focus on assertions rather than construction
//! boilerplate.

use crate::domain::evidence::Flags;
use crate::domain::forecast::{ConfidenceFactors, ForecastBatch, ForecastEntry, ForecastEstimate};
use crate::domain::id::MarketId;
use crate::domain::market::MarketQuote;
use crate::domain::opportunity::{Opportunity, OpportunityParts};

/// Liquidity used by [`entry`]; twice the default reference, so the
/// liquidity factor saturates at 1.
pub const DEEP_LIQUIDITY: f64 = 20_000.0;

/// Volatility used by [`opportunity`].
pub const TEST_VOLATILITY: f64 = 0.15;

/// Confidence factors whose weighted composite equals `confidence` under any
/// weights that sum to one.
pub fn uniform_factors(confidence: f64) -> ConfidenceFactors {
    ConfidenceFactors::new(confidence, confidence, confidence, confidence, confidence)
}

/// A deep-liquidity quote paired with a forecast of `probability` at
/// composite `confidence`.
pub fn entry(id: &str, price: f64, probability: f64, confidence: f64) -> ForecastEntry {
    ForecastEntry::new(
        MarketQuote::new(id, price, Some(DEEP_LIQUIDITY)),
        ForecastEstimate::new(id, probability, uniform_factors(confidence)),
    )
}

/// Wrap entries in a batch with no research usage.
pub fn batch(entries: Vec<ForecastEntry>) -> ForecastBatch {
    ForecastBatch::new(entries)
}

/// An already-scored opportunity with full liquidity and [`TEST_VOLATILITY`].
pub fn opportunity(id: &str, price: f64, probability: f64, confidence: f64) -> Opportunity {
    Opportunity::from_parts(OpportunityParts {
        market_id: MarketId::from(id),
        question: None,
        price,
        probability,
        confidence,
        liquidity_factor: 1.0,
        volatility: TEST_VOLATILITY,
        flags: Flags::default(),
    })
}

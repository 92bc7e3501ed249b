//! Per-record input faults.
//!
//! A [`DegenerateInput`] describes a single quote/forecast pair that cannot be
//! scored or sized. The allocation cycle skips that record, logs it, and keeps
//! processing the rest of the batch.
//!
//! # Examples
//!
//! ```
//! use bankroll::domain::error::DegenerateInput;
//! use bankroll::domain::market::MarketQuote;
//!
//! let quote = MarketQuote::new("m-1", 0.0, Some(5_000.0));
//! assert!(matches!(
//!     quote.validate(),
//!     Err(DegenerateInput::PriceOutOfRange { .. })
//! ));
//! ```

use thiserror::Error;

use super::id::MarketId;

/// Input that makes a single opportunity impossible to evaluate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DegenerateInput {
    /// Market price must lie strictly inside (0, 1).
    #[error("price {price} is outside the open interval (0, 1)")]
    PriceOutOfRange {
        /// The offending price.
        price: f64,
    },

    /// Forecast probability must lie inside [0, 1].
    #[error("probability {probability} is outside [0, 1]")]
    ProbabilityOutOfRange {
        /// The offending probability.
        probability: f64,
    },

    /// Confidence sub-scores must lie inside [0, 1].
    #[error("{factor} score {value} is outside [0, 1]")]
    FactorOutOfRange {
        /// Name of the sub-score.
        factor: &'static str,
        /// The offending value.
        value: f64,
    },

    /// The quote carries no liquidity figure.
    #[error("liquidity is missing")]
    MissingLiquidity,

    /// Liquidity must be a finite, non-negative amount.
    #[error("liquidity {liquidity} is not a finite non-negative amount")]
    InvalidLiquidity {
        /// The offending liquidity.
        liquidity: f64,
    },

    /// Neither the quote nor the profile provides a volatility estimate.
    #[error("volatility is missing")]
    MissingVolatility,

    /// Volatility must be a finite, non-negative number.
    #[error("volatility {volatility} is not a finite non-negative number")]
    InvalidVolatility {
        /// The offending volatility.
        volatility: f64,
    },

    /// Forecast carries neither explicit sub-scores nor research evidence.
    #[error("forecast has no confidence factors or evidence")]
    MissingConfidence,

    /// The quote and forecast refer to different markets.
    #[error("quote for {quote} paired with forecast for {forecast}")]
    MarketMismatch {
        /// Market of the quote.
        quote: MarketId,
        /// Market of the forecast.
        forecast: MarketId,
    },
}

impl DegenerateInput {
    /// Check that a value is a probability-like score in [0, 1].
    pub(crate) fn check_unit(factor: &'static str, value: f64) -> Result<(), Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(Self::FactorOutOfRange { factor, value })
        }
    }
}

//! Market quotes supplied by the market data collaborator.

use serde::{Deserialize, Serialize};

use super::error::DegenerateInput;
use super::id::MarketId;

/// Current market-implied state of a binary question.
///
/// `price` is the market-implied probability of the YES outcome. Liquidity is
/// in currency units. Volatility is optional and falls back to the active
/// profile's default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    /// Market identifier.
    pub market_id: MarketId,
    /// Market-implied probability, must lie in (0, 1).
    pub price: f64,
    /// Available liquidity in currency units.
    #[serde(default)]
    pub liquidity: Option<f64>,
    /// Price volatility estimate used for portfolio variance.
    #[serde(default)]
    pub volatility: Option<f64>,
    /// Human-readable question, carried through for diagnostics.
    #[serde(default)]
    pub question: Option<String>,
}

impl MarketQuote {
    /// Create a quote without volatility or question text.
    pub fn new(market_id: impl Into<MarketId>, price: f64, liquidity: Option<f64>) -> Self {
        Self {
            market_id: market_id.into(),
            price,
            liquidity,
            volatility: None,
            question: None,
        }
    }

    /// Attach a volatility estimate.
    #[must_use]
    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }

    /// Attach the question text.
    #[must_use]
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    /// Validate the price and liquidity of this quote.
    ///
    /// # Errors
    ///
    /// Returns [`DegenerateInput`] when the price is outside (0, 1) or the
    /// liquidity is missing, negative, or not finite.
    pub fn validate(&self) -> Result<(), DegenerateInput> {
        if !(self.price.is_finite() && self.price > 0.0 && self.price < 1.0) {
            return Err(DegenerateInput::PriceOutOfRange { price: self.price });
        }
        self.liquidity()?;
        Ok(())
    }

    /// Liquidity, validated.
    ///
    /// # Errors
    ///
    /// Returns [`DegenerateInput::MissingLiquidity`] or
    /// [`DegenerateInput::InvalidLiquidity`].
    pub fn liquidity(&self) -> Result<f64, DegenerateInput> {
        match self.liquidity {
            None => Err(DegenerateInput::MissingLiquidity),
            Some(l) if !l.is_finite() || l < 0.0 => {
                Err(DegenerateInput::InvalidLiquidity { liquidity: l })
            }
            Some(l) => Ok(l),
        }
    }

    /// Resolve volatility, falling back to `default` when the quote has none.
    ///
    /// # Errors
    ///
    /// Returns [`DegenerateInput::MissingVolatility`] when neither is present,
    /// or [`DegenerateInput::InvalidVolatility`] for a negative or non-finite value.
    pub fn volatility_or(&self, default: Option<f64>) -> Result<f64, DegenerateInput> {
        let volatility = self
            .volatility
            .or(default)
            .ok_or(DegenerateInput::MissingVolatility)?;
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(DegenerateInput::InvalidVolatility { volatility });
        }
        Ok(volatility)
    }
}

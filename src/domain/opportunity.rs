//! Scored opportunities.
//!
//! An [`Opportunity`] is derived fresh every cycle from one quote/forecast
//! pair and is never mutated afterwards. Construction goes through
//! [`OpportunityScorer`](crate::application::scoring::OpportunityScorer).

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::evidence::Flags;
use super::id::MarketId;

/// Which side of the binary question a position takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Bet the priced (YES) outcome; positive edge.
    For,
    /// Bet against the priced outcome; negative edge.
    Against,
}

impl Direction {
    /// Direction implied by the sign of an edge. Zero counts as `For`.
    #[must_use]
    pub fn from_edge(edge: f64) -> Self {
        if edge < 0.0 {
            Self::Against
        } else {
            Self::For
        }
    }

    /// `1.0` for `For`, `-1.0` for `Against`.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::For => 1.0,
            Self::Against => -1.0,
        }
    }

    /// Outcome label for operators.
    #[must_use]
    pub const fn outcome(self) -> &'static str {
        match self {
            Self::For => "YES",
            Self::Against => "NO",
        }
    }
}

/// How strongly an opportunity is recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Strong,
    Moderate,
}

impl Strength {
    const STRONG_EDGE: f64 = 0.15;
    const STRONG_CONFIDENCE: f64 = 0.7;

    /// Strong when both the edge and confidence clear their bars.
    #[must_use]
    pub fn classify(edge: f64, confidence: f64) -> Self {
        if edge.abs() > Self::STRONG_EDGE && confidence > Self::STRONG_CONFIDENCE {
            Self::Strong
        } else {
            Self::Moderate
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strong => write!(f, "strong"),
            Self::Moderate => write!(f, "moderate"),
        }
    }
}

/// An actionable opportunity that passed every scoring threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    market_id: MarketId,
    question: Option<String>,
    price: f64,
    probability: f64,
    edge: f64,
    confidence: f64,
    liquidity_factor: f64,
    score: f64,
    volatility: f64,
    strength: Strength,
    flags: Flags,
}

/// Field bundle for constructing an [`Opportunity`] inside the crate.
pub(crate) struct OpportunityParts {
    pub market_id: MarketId,
    pub question: Option<String>,
    pub price: f64,
    pub probability: f64,
    pub confidence: f64,
    pub liquidity_factor: f64,
    pub volatility: f64,
    pub flags: Flags,
}

impl Opportunity {
    /// Build an opportunity, deriving edge, score, and strength.
    pub(crate) fn from_parts(parts: OpportunityParts) -> Self {
        let edge = parts.probability - parts.price;
        let score = edge.abs() * parts.confidence * parts.liquidity_factor;
        Self {
            market_id: parts.market_id,
            question: parts.question,
            price: parts.price,
            probability: parts.probability,
            edge,
            confidence: parts.confidence,
            liquidity_factor: parts.liquidity_factor,
            score,
            volatility: parts.volatility,
            strength: Strength::classify(edge, parts.confidence),
            flags: parts.flags,
        }
    }

    #[must_use]
    pub fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    #[must_use]
    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    /// Market-implied probability.
    #[must_use]
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Model probability.
    #[must_use]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Signed edge: `probability - price`.
    #[must_use]
    pub fn edge(&self) -> f64 {
        self.edge
    }

    /// Weighted confidence composite.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    #[must_use]
    pub fn liquidity_factor(&self) -> f64 {
        self.liquidity_factor
    }

    /// `|edge| * confidence * liquidity_factor`.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        Direction::from_edge(self.edge)
    }

    #[must_use]
    pub fn strength(&self) -> Strength {
        self.strength
    }

    #[must_use]
    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    /// Human-readable recommendation, e.g. `strong BUY YES`.
    #[must_use]
    pub fn recommendation(&self) -> String {
        format!("{} BUY {}", self.strength, self.direction().outcome())
    }

    /// Ranking order: higher score first, then larger `|edge|`, then
    /// higher confidence.
    #[must_use]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.edge.abs().total_cmp(&self.edge.abs()))
            .then_with(|| other.confidence.total_cmp(&self.confidence))
    }
}

//! Value objects and invariants for forecast-driven capital allocation.

pub mod allocation;
pub mod error;
pub mod evidence;
pub mod forecast;
pub mod id;
pub mod market;
pub mod metrics;
pub mod opportunity;
pub mod profile;
pub mod risk;
pub mod snapshot;

pub use allocation::{Allocation, Position, SkipReason, SkippedOpportunity, Stake};
pub use error::DegenerateInput;
pub use evidence::{ConfidenceLevel, Flags, InformationQuality, ResearchEvidence, Source};
pub use forecast::{
    ConfidenceFactors, ConfidenceWeights, ForecastBatch, ForecastEntry, ForecastEstimate,
    ResearchUsage,
};
pub use id::{CycleId, MarketId};
pub use market::MarketQuote;
pub use metrics::PortfolioMetrics;
pub use opportunity::{Direction, Opportunity, Strength};
pub use profile::{Preset, StrategyProfile};
pub use risk::{ReductionFactors, RiskLevel, RiskLimits, RiskMetrics, RiskViolation};
pub use snapshot::PortfolioSnapshot;

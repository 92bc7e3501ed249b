use thiserror::Error;

use crate::domain::error::DegenerateInput;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unknown strategy '{name}' (expected conservative, balanced, aggressive, or a preset base)")]
    UnknownStrategy { name: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Cycle-level allocation failures. Any of these rejects the whole cycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error(
        "capital invariant violated: allocated {allocated} + unallocated {unallocated} != total {total}"
    )]
    CapitalInvariantViolation {
        allocated: f64,
        unallocated: f64,
        total: f64,
    },

    #[error("limit violated: {limit} is {actual}, cap {cap}")]
    LimitViolation {
        limit: &'static str,
        actual: f64,
        cap: f64,
    },

    #[error("total capital must be positive, got {capital}")]
    NonPositiveCapital { capital: f64 },
}

/// Risk monitor errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("snapshot at {timestamp} precedes the latest snapshot at {latest}")]
    OutOfOrderSnapshot {
        timestamp: chrono::DateTime<chrono::Utc>,
        latest: chrono::DateTime<chrono::Utc>,
    },

    #[error("portfolio value {value} is not a finite non-negative amount")]
    InvalidValue { value: f64 },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Degenerate(#[from] DegenerateInput),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Risk(#[from] RiskError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("background task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Cross-cycle risk tracking.

mod monitor;

pub use monitor::RiskMonitor;

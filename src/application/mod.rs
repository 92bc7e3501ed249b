//! Application services (use cases).
//!
//! These services run the allocation pipeline over domain values and
//! coordinate the persistence ports for cross-cycle risk state.

pub mod engine;
pub mod limits;
pub mod metrics;
pub mod risk;
pub mod scoring;
pub mod session;
pub mod sizing;

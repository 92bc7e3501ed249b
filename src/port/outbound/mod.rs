//! Outbound ports for infrastructure the engine depends on.

pub mod snapshot;

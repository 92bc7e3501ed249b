//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - the command-line interface.
//! - [`outbound`] - snapshot stores (in-memory and SQLite).

pub mod inbound;
pub mod outbound;

//! Outbound adapters implementing the persistence ports.

pub mod memory;
pub mod sqlite;

//! Infrastructure configuration modules.

pub mod logging;
pub mod risk;
pub mod scoring;
pub mod settings;
pub mod strategy;

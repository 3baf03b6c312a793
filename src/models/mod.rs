//! Core data models for promptsweep.
//!
//! - `config`: file configuration and the validated per-run experiment inputs
//! - `error`: fatal errors and per-call failures
//! - `record`: grid cells, result records and run statistics

mod config;
mod error;
mod record;

pub use config::*;
pub use error::*;
pub use record::*;

//! promptsweep - Grid-search sampling parameters against a chat completions API.
//!
//! ## Architecture
//!
//! For one fixed system/user prompt pair and model, promptsweep issues one
//! completion request per combination of temperature, max tokens, presence
//! penalty and frequency penalty, then persists every result.
//!
//! ## Pipeline
//!
//! `ParameterGrid` → `ExperimentRunner` (one `CompletionClient` call per cell,
//! strictly sequential) → `export_results` (CSV) → `generate_reflection` (text)
//!
//! ## Failure model
//!
//! - Configuration problems are fatal and surface before the first call
//! - A failed call becomes the sentinel text; the run always covers the whole grid
//! - Artifacts that cannot be written are fatal and never left half-written

pub mod client;
pub mod models;
pub mod output;
pub mod pipeline;

// Re-exports for convenience
pub use client::{CompletionClient, LLMClient};
pub use models::{
    CallFailure, Config, ConfigError, ERROR_SENTINEL, ExperimentConfig, Model, ParameterTuple,
    Result, ResultRecord, RunStats, SweepError,
};
pub use output::{export_results, generate_reflection, load_results, write_reflection};
pub use pipeline::{ExperimentRunner, ParameterGrid};

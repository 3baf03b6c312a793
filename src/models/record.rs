//! Parameter and result types for promptsweep.
//!
//! These types represent the data flowing from the grid, through the runner,
//! into the exported artifacts.
//!
//! - K_i: every record carries the exact parameters it was generated with
//! - I^B: generated text quality is unknowable here; records store it verbatim

use serde::{Deserialize, Serialize};

/// Text recorded for a combination whose completion call failed.
pub const ERROR_SENTINEL: &str = "[Error generating text]";

/// One cell of the sampling-parameter grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterTuple {
    pub temperature: f64,
    pub max_tokens: u32,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
}

impl std::fmt::Display for ParameterTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "temperature={:?}, max_tokens={}, presence_penalty={:?}, frequency_penalty={:?}",
            self.temperature, self.max_tokens, self.presence_penalty, self.frequency_penalty
        )
    }
}

/// Result of running one combination.
///
/// Field order and names are the column layout of the results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub temperature: f64,
    pub max_tokens: u32,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    pub model: String,
    /// Generated text, or [`ERROR_SENTINEL`] when the call failed
    #[serde(rename = "generated_description")]
    pub generated_text: String,
}

impl ResultRecord {
    /// Build a record from a grid cell and the text produced for it.
    pub fn new(params: ParameterTuple, model: impl Into<String>, generated_text: String) -> Self {
        Self {
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            presence_penalty: params.presence_penalty,
            frequency_penalty: params.frequency_penalty,
            model: model.into(),
            generated_text,
        }
    }

    /// Build the record for a failed call.
    pub fn failed(params: ParameterTuple, model: impl Into<String>) -> Self {
        Self::new(params, model, ERROR_SENTINEL.to_string())
    }

    /// The grid cell this record was produced from.
    pub fn params(&self) -> ParameterTuple {
        ParameterTuple {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
        }
    }

    /// Whether this record holds the failure sentinel.
    pub fn is_error(&self) -> bool {
        self.generated_text == ERROR_SENTINEL
    }
}

/// Statistics for a completed run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Combinations attempted
    pub total: usize,

    /// Calls that returned text
    pub succeeded: usize,

    /// Calls that failed and were replaced by the sentinel
    pub failed: usize,

    /// Total runtime in seconds
    pub runtime_secs: f64,

    /// Fraction of calls that succeeded (0.0 - 1.0)
    pub success_rate: f64,
}

impl RunStats {
    /// Calculate derived stats.
    pub fn finalize(&mut self) {
        if self.total > 0 {
            self.success_rate = self.succeeded as f64 / self.total as f64;
        }
    }
}

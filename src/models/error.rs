//! Error types for promptsweep.
//!
//! Taxonomy:
//! - Configuration failures are fatal and surface before any call is made
//! - Call failures are per-combination and never escape the client
//! - IO failures during export are fatal and surface after the run
//!
//! B_i(call succeeds) is never assumed: a falsified belief becomes a
//! [`CallFailure`] value, not an `Err` that aborts the sweep.

use thiserror::Error;

/// Top-level error type for promptsweep.
#[derive(Debug, Error)]
pub enum SweepError {
    // ═══════════════════════════════════════════════════════════════════
    // PRE-RUN — configuration rejected before the first call
    // ═══════════════════════════════════════════════════════════════════
    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    Network(#[from] reqwest::Error),

    // ═══════════════════════════════════════════════════════════════════
    // POST-RUN — artifacts could not be written or read back
    // ═══════════════════════════════════════════════════════════════════
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {context}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },
}

/// A single completion request that did not produce text.
///
/// Returned by value from the client; the runner substitutes the sentinel
/// text and moves on to the next combination.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CallFailure {
    #[error("Authentication failed: invalid API key")]
    AuthenticationFailed,

    #[error("Rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<f64> },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl SweepError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a CSV error with context.
    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            context: context.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for CallFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Result type alias for promptsweep.
pub type Result<T> = std::result::Result<T, SweepError>;

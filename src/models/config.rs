//! Configuration models for promptsweep.
//!
//! All I^R (resolvable ignorance) is parameterized here, in two layers:
//! - [`Config`]: endpoint, grid and output settings, loaded from an optional TOML file
//! - [`ExperimentConfig`]: the model and prompts for one run, validated before the run starts
//!
//! B_i(credential usable) is settled here, before the first call, never per call.

use crate::pipeline::ParameterGrid;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

/// Top-level file configuration for promptsweep.
///
/// Every section is optional; a missing file is equivalent to `Config::default()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chat completions endpoint
    #[serde(default)]
    pub api: ApiConfig,

    /// Sampling-parameter axes
    #[serde(default)]
    pub grid: ParameterGrid,

    /// Artifact locations
    #[serde(default)]
    pub output: OutputConfig,
}

/// OpenAI-compatible endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key (can also be set via the `api_key_env` variable)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable name for API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL for the API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Transport timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    180
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Tabular results file
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,

    /// Reflection text file
    #[serde(default = "default_reflection_path")]
    pub reflection_path: PathBuf,
}

fn default_results_path() -> PathBuf {
    PathBuf::from("results.csv")
}

fn default_reflection_path() -> PathBuf {
    PathBuf::from("reflection.txt")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: default_results_path(),
            reflection_path: default_reflection_path(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })
    }

    /// Check that every grid axis value is accepted by the API.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()
    }

    /// Resolve API key from config or environment.
    ///
    /// B_i(api key available) → Result
    ///
    /// A blank key, or one still holding an unset `${VAR}` placeholder, counts as
    /// missing. Surrounding whitespace is stripped.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        let key = match &self.api.api_key {
            Some(key) => expand_env_vars(key),
            None => std::env::var(&self.api.api_key_env).unwrap_or_default(),
        };

        if let Some(cap) = ENV_VAR_PATTERN.captures(&key) {
            return Err(ConfigError::MissingApiKey {
                env_var: cap[1].to_string(),
            });
        }

        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::MissingApiKey {
                env_var: self.api.api_key_env.clone(),
            });
        }
        Ok(key.to_string())
    }
}

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex"));

/// Expand environment variables in a string.
///
/// Supports ${VAR_NAME} syntax.
/// If the variable is not set, the placeholder is left unchanged.
pub fn expand_env_vars(s: &str) -> String {
    let mut result = s.to_string();

    for cap in ENV_VAR_PATTERN.captures_iter(s) {
        if let Ok(value) = std::env::var(&cap[1]) {
            result = result.replace(&cap[0], &value);
        }
    }

    result
}

/// Models the sweep may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "gpt-4")]
    Gpt4,
}

impl Model {
    pub const ALL: [Model; 2] = [Model::Gpt35Turbo, Model::Gpt4];

    /// Model ID sent to the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Gpt35Turbo => "gpt-3.5-turbo",
            Model::Gpt4 => "gpt-4",
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Model::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidModel(s.to_string()))
    }
}

/// Model and prompts for a single run.
///
/// Immutable once built; the runner only ever borrows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentConfig {
    pub model: Model,
    pub system_prompt: String,
    pub user_prompt: String,
    /// `None` means no stop sequence is sent at all
    pub stop_sequence: Option<String>,
}

impl ExperimentConfig {
    /// Validate and normalize collected inputs.
    ///
    /// Prompts are trimmed and must be non-empty. A blank stop sequence becomes `None`.
    pub fn new(
        model: Model,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        stop_sequence: Option<String>,
    ) -> Result<Self, ConfigError> {
        let system_prompt = system_prompt.into().trim().to_string();
        if system_prompt.is_empty() {
            return Err(ConfigError::EmptyPrompt("system"));
        }

        let user_prompt = user_prompt.into().trim().to_string();
        if user_prompt.is_empty() {
            return Err(ConfigError::EmptyPrompt("user"));
        }

        let stop_sequence = stop_sequence
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            model,
            system_prompt,
            user_prompt,
            stop_sequence,
        })
    }
}

/// Configuration errors.
///
/// All of these are fatal and abort before any request is made.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Missing API key: set {env_var} env var or api_key in config")]
    MissingApiKey { env_var: String },

    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("Invalid model '{0}': expected 'gpt-3.5-turbo' or 'gpt-4'")]
    InvalidModel(String),

    #[error("The {0} prompt must not be empty")]
    EmptyPrompt(&'static str),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),
}

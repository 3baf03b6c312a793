//! Chat completions client for OpenAI-compatible endpoints.
//!
//! Each call is attempted exactly once. Every way a call can go wrong
//! (transport, auth, rate limit, malformed body) comes back as a
//! [`CallFailure`] value; nothing escapes as a panic or a fatal error.
//!
//! ## Epistemic state
//!
//! - K_i: the request shape (two messages, sampling parameters, optional stop)
//! - B_i(endpoint reachable and key accepted) → checked per call, never assumed
//! - I^B: whether the model honors the stop sequence; the text is taken as returned

use crate::models::{
    ApiConfig, CallFailure, ConfigError, ExperimentConfig, ParameterTuple, Result, SweepError,
};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Something that can turn one grid cell into generated text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        config: &ExperimentConfig,
        params: &ParameterTuple,
    ) -> std::result::Result<String, CallFailure>;
}

/// Message in a chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request payload.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f64,
    max_tokens: u32,
    presence_penalty: f64,
    frequency_penalty: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a str>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn new(config: &'a ExperimentConfig, params: &ParameterTuple) -> Self {
        Self {
            model: config.model.as_str(),
            messages: vec![
                Message::system(config.system_prompt.as_str()),
                Message::user(config.user_prompt.as_str()),
            ],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            presence_penalty: params.presence_penalty,
            frequency_penalty: params.frequency_penalty,
            stop: config.stop_sequence.as_deref().filter(|s| !s.is_empty()),
        }
    }
}

/// Chat completion response.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// API error response (OpenAI-compatible).
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// HTTP client for an OpenAI-compatible chat completions endpoint.
pub struct LLMClient {
    client: reqwest::Client,
    auth: HeaderValue,
    base_url: String,
}

impl LLMClient {
    /// Create a new client.
    ///
    /// The timeout applies to the transport as a whole; the runner adds none of its own.
    pub fn new(api_key: String, base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let builder = reqwest::Client::builder().timeout(Duration::from_secs(timeout_secs));
        Self::with_builder(api_key, base_url, builder)
    }

    fn with_builder(
        api_key: String,
        base_url: impl Into<String>,
        builder: reqwest::ClientBuilder,
    ) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
            ConfigError::InvalidApiKey("contains characters not allowed in a header".to_string())
        })?;
        auth.set_sensitive(true);

        let client = builder.build().map_err(SweepError::Network)?;

        Ok(Self {
            client,
            auth,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the `[api]` config section and an already-resolved key.
    pub fn from_config(api: &ApiConfig, api_key: String) -> Result<Self> {
        Self::new(api_key, api.base_url.clone(), api.timeout_secs)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build headers for a request.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.auth.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    async fn send(
        &self,
        config: &ExperimentConfig,
        params: &ParameterTuple,
    ) -> std::result::Result<String, CallFailure> {
        let request = ChatCompletionRequest::new(config, params);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(&request)
            .send()
            .await?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<f64>().ok());
            return Err(CallFailure::RateLimited { retry_after_secs });
        }

        if !response.status().is_success() {
            if status == 401 {
                return Err(CallFailure::AuthenticationFailed);
            }
            let error_body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorResponse>(&error_body) {
                Ok(api_error) => api_error.error.message,
                Err(_) => error_body,
            };
            return Err(CallFailure::Api { status, message });
        }

        let body = response.text().await?;
        parse_completion(&body)
    }
}

/// Extract the trimmed text of the first choice from a response body.
fn parse_completion(body: &str) -> std::result::Result<String, CallFailure> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| CallFailure::InvalidResponse(format!("Failed to parse response: {e}")))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CallFailure::InvalidResponse("No choices in response".to_string()))?;

    choice
        .message
        .content
        .map(|content| content.trim().to_string())
        .ok_or_else(|| CallFailure::InvalidResponse("Choice has no content".to_string()))
}

#[async_trait]
impl CompletionClient for LLMClient {
    async fn complete(
        &self,
        config: &ExperimentConfig,
        params: &ParameterTuple,
    ) -> std::result::Result<String, CallFailure> {
        let start = Instant::now();
        let result = self.send(config, params).await;

        match &result {
            Ok(text) => debug!(
                model = %config.model,
                %params,
                chars = text.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Completion succeeded"
            ),
            // The runner reports the failure with its combination index
            Err(e) => debug!(
                model = %config.model,
                %params,
                error = %e,
                "Error during API call"
            ),
        }

        result
    }
}

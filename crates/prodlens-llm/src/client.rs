//! HTTP client for the Gemini `generateContent` REST endpoint.

use std::time::Duration;

use prodlens_core::AppConfig;
use reqwest::{Client, Url};

use crate::error::LlmError;
use crate::retry::retry_with_backoff;
use crate::types::{ErrorEnvelope, GenerateRequest, GenerateResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

/// Finish reasons that mean the provider filtered the answer.
const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
    "RECITATION",
];

/// Non-JSON error bodies are cut to this many characters in messages.
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Client for one Gemini model.
///
/// Use [`GeminiClient::new`] for production or
/// [`GeminiClient::with_base_url`] to point at a mock server in tests.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    model: String,
    endpoint: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The endpoint carries the API key.
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Creates a client for `model` against the production API.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::NotConfigured`] for a blank key and
    /// [`LlmError::Http`] if the `reqwest::Client` cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new), plus [`LlmError::InvalidRequest`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(LlmError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("prodlens/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let raw = format!(
            "{}/v1beta/models/{model}:generateContent",
            base_url.trim_end_matches('/')
        );
        let mut endpoint = Url::parse(&raw).map_err(|e| {
            LlmError::InvalidRequest(format!("invalid base URL '{base_url}': {e}"))
        })?;
        endpoint.query_pairs_mut().append_pair("key", api_key);

        Ok(Self {
            client,
            model: model.to_owned(),
            endpoint,
            max_retries: 2,
            backoff_base_ms: 1_000,
        })
    }

    /// Builds a client from `GEMINI_API_KEY`, `PRODLENS_LLM_MODEL` and
    /// `PRODLENS_LLM_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::NotConfigured`] when no API key is set.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, LlmError> {
        let key = config
            .gemini_api_key
            .as_deref()
            .ok_or(LlmError::NotConfigured)?;
        Self::new(key, &config.llm_model, config.llm_timeout_secs)
    }

    /// Overrides the retry policy for transient failures.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` as a single user turn and returns the answer text.
    ///
    /// # Errors
    ///
    /// - [`LlmError::QuotaExceeded`] on HTTP 429 / `RESOURCE_EXHAUSTED`.
    /// - [`LlmError::Api`] on any other non-2xx status (5xx retried).
    /// - [`LlmError::Blocked`] when the safety filter withheld the answer.
    /// - [`LlmError::EmptyResponse`] when no text came back.
    /// - [`LlmError::Deserialize`] if the body is not the expected shape.
    /// - [`LlmError::Http`] on network failure after all retries.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let answer = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.generate_once(prompt)
        })
        .await?;
        tracing::debug!(model = %self.model, chars = answer.len(), "language model answered");
        Ok(answer)
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&GenerateRequest::user_prompt(prompt))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = api_error(status.as_u16(), &body);
            tracing::warn!(
                model = %self.model,
                status = status.as_u16(),
                error = %err,
                "language model request failed"
            );
            return Err(err);
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Deserialize {
                context: format!("generateContent(model={})", self.model),
                source: e,
            })?;
        answer_text(parsed)
    }
}

/// Maps a non-2xx response to [`LlmError::QuotaExceeded`] or
/// [`LlmError::Api`], preferring the message from the JSON error envelope.
pub(crate) fn api_error(status: u16, body: &str) -> LlmError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let exhausted = status == 429
        || envelope
            .as_ref()
            .and_then(|e| e.error.status.as_deref())
            .is_some_and(|s| s == "RESOURCE_EXHAUSTED");
    let message = envelope
        .map(|e| e.error.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect());

    if exhausted {
        LlmError::QuotaExceeded(message)
    } else {
        LlmError::Api { status, message }
    }
}

/// Joins the text parts of the first candidate.
pub(crate) fn answer_text(response: GenerateResponse) -> Result<String, LlmError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(LlmError::Blocked { reason });
    }
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    let text = text.trim();
    if !text.is_empty() {
        return Ok(text.to_owned());
    }

    match candidate.finish_reason {
        Some(reason) if BLOCKING_FINISH_REASONS.contains(&reason.as_str()) => {
            Err(LlmError::Blocked { reason })
        }
        _ => Err(LlmError::EmptyResponse),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

use thiserror::Error;

/// Errors returned by the language-model client.
///
/// Every variant reaches the caller; no failure is turned into a made-up
/// answer.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No API key is configured.
    #[error("language model is not configured (set GEMINI_API_KEY)")]
    NotConfigured,

    /// The request itself is unusable, e.g. an empty question.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP 429 or `RESOURCE_EXHAUSTED`.
    #[error("language model quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Non-2xx response other than quota exhaustion.
    #[error("language model API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The prompt or the answer was withheld by the provider's safety filter.
    #[error("language model withheld the answer: {reason}")]
    Blocked { reason: String },

    /// A 2xx response with no answer text.
    #[error("language model returned an empty answer")]
    EmptyResponse,

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

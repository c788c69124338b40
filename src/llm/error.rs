//! LLM error types.

use thiserror::Error;

/// Errors that can occur when routing a request to an LLM backend.
#[derive(Debug, Error)]
pub enum LLMError {
    /// No usable provider configuration. User-actionable, never retried.
    #[error("no AI provider configured; run `revq init` first")]
    NotConfigured,

    /// HTTP request failed before a response arrived.
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The backend answered but its text was not valid review JSON.
    #[error("backend returned malformed review JSON: {reason}")]
    MalformedReview { reason: String },

    /// Every substitute model in the fallback chain failed too.
    #[error("all fallback models exhausted; last error: {last}")]
    FallbacksExhausted { last: Box<LLMError> },
}

impl LLMError {
    /// Whether this failure is a quota/rate-limit signal worth retrying
    /// against a substitute model. A 429 always qualifies; Gemini also
    /// reports exhaustion through the error message body.
    pub fn is_quota_exhausted(&self) -> bool {
        match self {
            LLMError::Api { status: 429, .. } => true,
            LLMError::Api { message, .. } => {
                let lower = message.to_ascii_lowercase();
                lower.contains("resource_exhausted")
                    || lower.contains("resource exhausted")
                    || lower.contains("quota")
            }
            _ => false,
        }
    }
}

/// Turn a non-success response into an [`LLMError::Api`], preferring the
/// structured `error.message` the backends embed in the body over the raw
/// body text.
pub(super) async fn api_error(response: reqwest::Response) -> LLMError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body,
    };
    LLMError::Api { status, message }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(serde::Deserialize)]
struct ErrorDetail {
    message: String,
}

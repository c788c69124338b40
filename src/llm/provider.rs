//! Backend family identifier and the adapter trait.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::LLMError;
use super::types::CompletionRequest;

/// One of the three supported backend families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAI,
    #[default]
    Gemini,
    Claude,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Provider::OpenAI => "openai",
            Provider::Gemini => "gemini",
            Provider::Claude => "claude",
        };
        f.write_str(s)
    }
}

/// Trait for backend adapters with different wire formats.
///
/// Adapters own all wire-format knowledge: request schema, auth scheme, and
/// the walk through the response shape. They return nothing but the response
/// text, normalized.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Run one completion request and return the response text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, LLMError>;
}

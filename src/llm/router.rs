//! Provider routing.
//!
//! The router owns the dispatch decision: given a configuration it picks
//! exactly one backend adapter, shapes the generic prompt for that family,
//! and normalizes review responses back into [`StructuredReview`].

use std::sync::Arc;

use tracing::debug;

use super::anthropic::AnthropicProvider;
use super::error::LLMError;
use super::fallback::FallbackChain;
use super::gemini::GeminiProvider;
use super::openai::OpenAIProvider;
use super::provider::{LLMProvider, Provider};
use super::types::{CompletionRequest, Message, StructuredReview};
use crate::config::Config;
use crate::prompt;
use crate::store::ReviewContext;

pub struct ProviderRouter {
    provider: Provider,
    adapter: Arc<dyn LLMProvider>,
    model: String,
    fallback: FallbackChain,
}

impl std::fmt::Debug for ProviderRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRouter")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

impl ProviderRouter {
    /// Build a router for the configured backend.
    ///
    /// Fails with [`LLMError::NotConfigured`] before any network activity
    /// when no API key is present.
    pub fn from_config(config: &Config) -> Result<Self, LLMError> {
        if !config.is_configured() {
            return Err(LLMError::NotConfigured);
        }

        let adapter: Arc<dyn LLMProvider> = match config.provider {
            Provider::OpenAI => Arc::new(OpenAIProvider::new(
                config.api_key.clone(),
                OpenAIProvider::DEFAULT_BASE_URL.to_string(),
            )),
            Provider::Gemini => Arc::new(GeminiProvider::new(
                config.api_key.clone(),
                GeminiProvider::DEFAULT_BASE_URL.to_string(),
            )),
            Provider::Claude => Arc::new(AnthropicProvider::new(
                config.api_key.clone(),
                AnthropicProvider::DEFAULT_BASE_URL.to_string(),
            )),
        };

        Ok(Self::new(config.provider, adapter, config.model.clone()))
    }

    /// Build a router around an explicit adapter. Used by tests and by
    /// callers that need a non-default base URL.
    pub fn new(provider: Provider, adapter: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            adapter,
            model: model.into(),
            fallback: FallbackChain::gemini(),
        }
    }

    /// Request a structured review of `code`.
    pub async fn review_code(
        &self,
        code: &str,
        file_path: &str,
        context: Option<&ReviewContext>,
    ) -> Result<StructuredReview, LLMError> {
        let review_prompt = prompt::build_review_prompt(code, file_path, context);
        let text = self
            .complete(vec![Message::user(review_prompt)], true)
            .await?;
        parse_review(&text)
    }

    /// Continue a conversation; returns the assistant's raw reply.
    pub async fn chat(&self, message: &str, history: &[Message]) -> Result<String, LLMError> {
        let messages = match self.provider {
            // Gemini takes one text blob, so the rolling history is
            // flattened through the prompt builder.
            Provider::Gemini => vec![Message::user(prompt::build_chat_prompt(message, history))],
            Provider::OpenAI | Provider::Claude => {
                let mut messages = history.to_vec();
                messages.push(Message::user(message));
                messages
            }
        };
        self.complete(messages, false).await
    }

    async fn complete(
        &self,
        messages: Vec<Message>,
        json_response: bool,
    ) -> Result<String, LLMError> {
        debug!(provider = %self.provider, model = %self.model, "dispatching completion");

        match self.provider {
            Provider::Gemini => {
                self.fallback
                    .execute(&self.model, |model| {
                        let adapter = Arc::clone(&self.adapter);
                        let request = CompletionRequest {
                            model,
                            messages: messages.clone(),
                            max_tokens: None,
                            json_response,
                        };
                        async move { adapter.complete(request).await }
                    })
                    .await
            }
            Provider::OpenAI | Provider::Claude => {
                self.adapter
                    .complete(CompletionRequest {
                        model: self.model.clone(),
                        messages,
                        max_tokens: None,
                        json_response,
                    })
                    .await
            }
        }
    }
}

/// Strip incidental ```json fences. Backends are told not to wrap the JSON,
/// but they do anyway often enough that ignoring the fence is cheaper than
/// failing the review.
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

fn parse_review(text: &str) -> Result<StructuredReview, LLMError> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(&cleaned).map_err(|e| LLMError::MalformedReview {
        reason: e.to_string(),
    })
}

//! OpenAI adapter (chat completions, bearer-token auth).

use async_trait::async_trait;
use reqwest::Client;

use super::error::{LLMError, api_error};
use super::provider::LLMProvider;
use super::types::{CompletionRequest, Message};

pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAIProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LLMError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = to_request(&request);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let parsed: Response = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LLMError::Api {
                status: 200,
                message: "response contained no choices".to_string(),
            })
    }
}

// --- Request/Response types ---

#[derive(serde::Serialize)]
struct Request {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(serde::Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(serde::Deserialize)]
struct Response {
    choices: Vec<Choice>,
}

#[derive(serde::Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(serde::Deserialize)]
struct ChoiceMessage {
    content: String,
}

fn to_request(request: &CompletionRequest) -> Request {
    Request {
        model: request.model.clone(),
        messages: request.messages.clone(),
        max_tokens: request.max_tokens,
        response_format: request
            .json_response
            .then_some(ResponseFormat {
                format_type: "json_object",
            }),
    }
}

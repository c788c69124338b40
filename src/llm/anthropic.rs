//! Claude adapter (Anthropic messages API, `x-api-key` auth).

use async_trait::async_trait;
use reqwest::Client;

use super::error::{LLMError, api_error};
use super::provider::LLMProvider;
use super::types::{CompletionRequest, Role};

pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AnthropicProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";
    pub const API_VERSION: &'static str = "2023-06-01";
    const DEFAULT_MAX_TOKENS: u32 = 1024;

    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LLMError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = to_request(&request);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", Self::API_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let parsed: Response = response.json().await?;
        let text = parsed
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(LLMError::Api {
                status: 200,
                message: "response contained no text blocks".to_string(),
            });
        }
        Ok(text)
    }
}

// --- Request/Response types ---

#[derive(serde::Serialize)]
struct Request {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<RequestMessage>,
}

#[derive(serde::Serialize)]
struct RequestMessage {
    role: String,
    content: String,
}

#[derive(serde::Deserialize)]
struct Response {
    content: Vec<Content>,
}

#[derive(serde::Deserialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

fn to_request(request: &CompletionRequest) -> Request {
    let mut system = None;
    let mut messages = Vec::new();

    for msg in &request.messages {
        match msg.role {
            // Anthropic wants system as a separate field
            Role::System => system = Some(msg.content.clone()),
            Role::User => messages.push(RequestMessage {
                role: "user".to_string(),
                content: msg.content.clone(),
            }),
            Role::Assistant => messages.push(RequestMessage {
                role: "assistant".to_string(),
                content: msg.content.clone(),
            }),
        }
    }

    Request {
        model: request.model.clone(),
        max_tokens: request
            .max_tokens
            .unwrap_or(AnthropicProvider::DEFAULT_MAX_TOKENS),
        system,
        messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::Message;

    #[test]
    fn system_message_becomes_system_field() {
        let request = to_request(&CompletionRequest {
            model: "claude-3-sonnet-20240229".to_string(),
            messages: vec![
                Message {
                    role: Role::System,
                    content: "be terse".to_string(),
                },
                Message::user("hi"),
            ],
            max_tokens: None,
            json_response: false,
        });

        assert_eq!(request.system.as_deref(), Some("be terse"));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
        assert_eq!(request.max_tokens, 1024);
    }

    #[test]
    fn response_text_joins_text_blocks() {
        let json = r#"{
            "id": "msg_01",
            "content": [
                {"type": "text", "text": "part one "},
                {"type": "tool_use", "text": ""},
                {"type": "text", "text": "part two"}
            ]
        }"#;
        let parsed: Response = serde_json::from_str(json).unwrap();
        let text = parsed
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");
        assert_eq!(text, "part one part two");
    }
}

use async_trait::async_trait;
use formsmith_storage::{ChatMessage, Role};
use serde_json::{json, Value};

use super::{post_json, LlmClient, LlmError, Sampling};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API.
pub struct AnthropicClient {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub sampling: Sampling,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String, sampling: Sampling) -> Self {
        Self {
            api_key,
            model,
            base_url: ANTHROPIC_BASE_URL.to_string(),
            sampling,
        }
    }

    /// The system prompt travels in its own field; system turns in the
    /// history are dropped.
    pub fn request_body(&self, system_prompt: &str, history: &[ChatMessage], message: &str) -> Value {
        let mut messages: Vec<Value> = history
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                json!({
                    "role": if m.role == Role::User { "user" } else { "assistant" },
                    "content": m.content,
                })
            })
            .collect();
        messages.push(json!({"role": "user", "content": message}));

        json!({
            "model": self.model,
            "max_tokens": self.sampling.max_tokens,
            "temperature": self.sampling.temperature,
            "system": system_prompt,
            "messages": messages,
        })
    }
}

/// Extract `content[0].text`.
pub fn extract_text(response: &Value) -> Result<String, LlmError> {
    response["content"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|c| c["text"].as_str())
        .map(str::to_string)
        .ok_or_else(|| LlmError::Parse("No text content in Anthropic response".to_string()))
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn send(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, LlmError> {
        let body = self.request_body(system_prompt, history, message);
        let url = format!("{}/v1/messages", self.base_url);
        let headers = vec![
            ("x-api-key", self.api_key.clone()),
            ("anthropic-version", ANTHROPIC_VERSION.to_string()),
            ("content-type", "application/json".to_string()),
        ];
        let response = post_json(url, headers, body).await?;
        extract_text(&response)
    }
}

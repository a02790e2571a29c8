use async_trait::async_trait;
use formsmith_storage::{ChatMessage, Role};
use serde_json::{json, Value};

use super::{post_json, LlmClient, LlmError, Sampling};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Client for the OpenAI Chat Completions API.
pub struct OpenAiClient {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub sampling: Sampling,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, sampling: Sampling) -> Self {
        Self {
            api_key,
            model,
            base_url: OPENAI_BASE_URL.to_string(),
            sampling,
        }
    }

    pub fn request_body(&self, system_prompt: &str, history: &[ChatMessage], message: &str) -> Value {
        let mut messages = vec![json!({"role": "system", "content": system_prompt})];
        messages.extend(history.iter().map(|m| {
            let role = match m.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            json!({"role": role, "content": m.content})
        }));
        messages.push(json!({"role": "user", "content": message}));

        json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.sampling.temperature,
            "max_tokens": self.sampling.max_tokens,
        })
    }
}

/// Extract `choices[0].message.content`.
pub fn extract_text(response: &Value) -> Result<String, LlmError> {
    response["choices"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|c| c["message"]["content"].as_str())
        .map(str::to_string)
        .ok_or_else(|| LlmError::Parse("No message content in OpenAI response".to_string()))
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn send(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, LlmError> {
        let body = self.request_body(system_prompt, history, message);
        let url = format!("{}/v1/chat/completions", self.base_url);
        let headers = vec![
            ("authorization", format!("Bearer {}", self.api_key)),
            ("content-type", "application/json".to_string()),
        ];
        let response = post_json(url, headers, body).await?;
        extract_text(&response)
    }
}

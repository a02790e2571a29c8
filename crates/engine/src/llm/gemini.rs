use async_trait::async_trait;
use formsmith_storage::{ChatMessage, Role};
use serde_json::{json, Value};

use super::{post_json, LlmClient, LlmError, Sampling};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Client for the Gemini `generateContent` API.
pub struct GeminiClient {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub sampling: Sampling,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, sampling: Sampling) -> Self {
        Self {
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
            sampling,
        }
    }

    /// Gemini calls the assistant role `model` and has no system turns.
    pub fn request_body(&self, system_prompt: &str, history: &[ChatMessage], message: &str) -> Value {
        let mut contents: Vec<Value> = history
            .iter()
            .filter_map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                    Role::System => return None,
                };
                Some(json!({"role": role, "parts": [{"text": m.content}]}))
            })
            .collect();
        contents.push(json!({"role": "user", "parts": [{"text": message}]}));

        json!({
            "systemInstruction": {"parts": [{"text": system_prompt}]},
            "contents": contents,
            "generationConfig": {
                "temperature": self.sampling.temperature,
                "maxOutputTokens": self.sampling.max_tokens,
            },
        })
    }
}

/// Concatenate the text parts of the first candidate.
pub fn extract_text(response: &Value) -> Result<String, LlmError> {
    let parts = response["candidates"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|c| c["content"]["parts"].as_array())
        .ok_or_else(|| LlmError::Parse("No candidates in Gemini response".to_string()))?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.is_empty() {
        return Err(LlmError::Parse("No text in Gemini response".to_string()));
    }
    Ok(text)
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn send(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, LlmError> {
        tracing::info!(model = %self.model, "using Gemini model");
        let body = self.request_body(system_prompt, history, message);
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let headers = vec![("content-type", "application/json".to_string())];
        let response = post_json(url, headers, body).await?;
        extract_text(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_turns_become_model_turns() {
        let client = GeminiClient::new(
            "key".into(),
            "gemini-2.5-flash".into(),
            Sampling {
                max_tokens: 2000,
                temperature: 0.7,
            },
        );
        let history = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")];
        let body = client.request_body("rules", &history, "a survey please");
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "a survey please");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "rules");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2000);
    }

    #[test]
    fn joins_text_parts() {
        let response = json!({
            "candidates": [{"content": {"parts": [{"text": "Hel"}, {"text": "lo"}]}}]
        });
        assert_eq!(extract_text(&response).unwrap(), "Hello");
        assert!(extract_text(&json!({"candidates": []})).is_err());
    }
}

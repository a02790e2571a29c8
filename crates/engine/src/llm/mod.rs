//! LLM provider boundary: the `LlmClient` trait, its error type, the REST
//! clients for each supported provider and a config-driven router.

mod anthropic;
mod gemini;
mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use formsmith_storage::ChatMessage;

use crate::config::{ConfigError, ConfigProvider, Provider};

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// Error type for LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Network or HTTP transport error.
    #[error("LLM network error: {0}")]
    Network(String),
    /// The provider answered with an error status.
    #[error("LLM API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// The provider's answer could not be read.
    #[error("LLM parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A text-completion service.
///
/// Implementations absorb all provider-specific request and response shapes;
/// callers see only the assistant's answer text.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send `message` after `history` and return the assistant's answer.
    async fn send(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, LlmError>;
}

/// Sampling settings shared by every provider client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Dispatches each call to the client for the currently configured provider.
///
/// Configuration is read on every call so a changed provider or key takes
/// effect without restarting.
pub struct ProviderRouter {
    config: Arc<dyn ConfigProvider>,
}

impl ProviderRouter {
    pub fn new(config: Arc<dyn ConfigProvider>) -> Self {
        ProviderRouter { config }
    }

    fn client(&self) -> Result<Box<dyn LlmClient>, LlmError> {
        let cfg = self.config.config()?;
        cfg.validate()?;
        let provider = cfg.provider;
        let api_key = cfg
            .api_key(provider)
            .ok_or(ConfigError::MissingApiKey(provider))?
            .to_string();
        let model = cfg.model(provider).to_string();
        let sampling = Sampling {
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        };
        tracing::debug!(provider = provider.as_str(), model = %model, "routing LLM call");
        Ok(match provider {
            Provider::Gemini => Box::new(GeminiClient::new(api_key, model, sampling)),
            Provider::OpenAi => Box::new(OpenAiClient::new(api_key, model, sampling)),
            Provider::Anthropic => Box::new(AnthropicClient::new(api_key, model, sampling)),
        })
    }
}

#[async_trait]
impl LlmClient for ProviderRouter {
    async fn send(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, LlmError> {
        self.client()?.send(system_prompt, history, message).await
    }
}

/// POST a JSON body and read a JSON answer.
///
/// `ureq` is synchronous, so the call runs on the blocking pool.
async fn post_json(
    url: String,
    headers: Vec<(&'static str, String)>,
    body: serde_json::Value,
) -> Result<serde_json::Value, LlmError> {
    tokio::task::spawn_blocking(move || {
        let agent = ureq::Agent::new_with_defaults();
        let mut request = agent.post(&url);
        for (name, value) in &headers {
            request = request.header(*name, value.as_str());
        }
        match request.send_json(&body) {
            Ok(resp) => resp
                .into_body()
                .read_json::<serde_json::Value>()
                .map_err(|e| LlmError::Parse(format!("invalid response body: {}", e))),
            Err(ureq::Error::StatusCode(status)) => Err(LlmError::Api {
                status,
                message: format!("request to {} failed", redact(&url)),
            }),
            Err(e) => Err(LlmError::Network(e.to_string())),
        }
    })
    .await
    .map_err(|e| LlmError::Network(format!("task join error: {}", e)))?
}

/// Strip the query string, which may carry an API key.
fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

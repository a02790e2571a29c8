#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use formsmith_core::{FieldSpec, FieldType, FormSpec};
use formsmith_engine::{AiConfig, Engine, LlmClient, LlmError, StaticConfig};
use formsmith_storage::{ChatMessage, MemoryStorage};

/// One captured `send` call.
#[derive(Debug, Clone)]
pub struct SentCall {
    pub system_prompt: String,
    pub history: Vec<ChatMessage>,
    pub message: String,
}

/// LLM double that pops scripted answers in order.
#[derive(Default)]
pub struct ScriptedLlm {
    answers: Mutex<Vec<Result<String, LlmError>>>,
    pub calls: Mutex<Vec<SentCall>>,
}

impl ScriptedLlm {
    pub fn new(answers: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(ScriptedLlm {
            answers: Mutex::new(answers),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn answering(texts: &[&str]) -> Arc<Self> {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn calls(&self) -> Vec<SentCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn send(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(SentCall {
            system_prompt: system_prompt.to_string(),
            history: history.to_vec(),
            message: message.to_string(),
        });
        let mut queue = self.answers.lock().unwrap();
        if queue.is_empty() {
            return Err(LlmError::Network("script exhausted".to_string()));
        }
        queue.remove(0)
    }
}

pub fn engine_with(llm: Arc<ScriptedLlm>) -> Engine<MemoryStorage> {
    Engine::new(
        Arc::new(MemoryStorage::new()),
        llm,
        Arc::new(StaticConfig(AiConfig::default())),
    )
}

pub fn engine() -> Engine<MemoryStorage> {
    engine_with(ScriptedLlm::answering(&[]))
}

pub fn feedback_spec() -> FormSpec {
    FormSpec::new(
        "Customer Feedback",
        vec![
            FieldSpec::new("customer_name", FieldType::Data).required(),
            FieldSpec::new("rating", FieldType::Rating).with_options("5"),
        ],
    )
}

pub const FEEDBACK_ANSWER: &str = "Perfect! Here's your form:\n\n```json\n{\n  \"doctype_name\": \"Customer Feedback\",\n  \"fields\": [\n    {\"fieldname\": \"customer_name\", \"label\": \"Customer Name\", \"fieldtype\": \"Data\", \"mandatory\": true},\n    {\"fieldname\": \"rating\", \"label\": \"Rating\", \"fieldtype\": \"Rating\", \"options\": \"5\"}\n  ]\n}\n```\n\nClick the 'Create Form' button to generate it!";

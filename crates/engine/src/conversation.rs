//! Conversation service: sessions, turns and imported drafts.

use formsmith_core::{parse_response, validate, FormSpec, ValidationIssue};
use formsmith_storage::{ChatMessage, ConversationRecord, FormStorage};
use serde::Serialize;

use crate::actor::Actor;
use crate::error::EngineError;
use crate::prompt;
use crate::service::{new_id, timestamp, Engine};

/// Opening line of every new session.
pub const GREETING: &str = "Hi! What form do you want to create? Tell me what fields you need.";

pub const DEFAULT_TEMPLATE: &str = "custom";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStarted {
    pub session_id: String,
    pub message: String,
}

/// The outcome of one conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnResponse {
    pub message: String,
    pub ready_to_generate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_specification: Option<FormSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedDraft {
    pub session_id: String,
    /// Validation issues of the imported draft; generation fails until fixed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ValidationIssue>,
}

impl<S: FormStorage> Engine<S> {
    pub async fn start_session(
        &self,
        actor: &Actor,
        template: Option<&str>,
    ) -> Result<SessionStarted, EngineError> {
        let conversation = ConversationRecord {
            id: new_id(),
            owner: actor.name.clone(),
            template: template.unwrap_or(DEFAULT_TEMPLATE).to_string(),
            state: "active".to_string(),
            history: Vec::new(),
            draft_specification: None,
            created_at: timestamp(),
        };
        let session_id = conversation.id.clone();
        self.storage.insert_conversation(conversation).await?;
        self.storage.commit().await?;
        tracing::info!(session = %session_id, actor = %actor.name, "session started");
        Ok(SessionStarted {
            session_id,
            message: GREETING.to_string(),
        })
    }

    /// Send one user message and record the assistant's answer.
    ///
    /// An answer that trips the tutorial filter is regenerated once with a
    /// stricter request; the second answer is used as is. Provider failures
    /// leave the conversation untouched.
    pub async fn send_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<TurnResponse, EngineError> {
        let mut conversation = self.storage.get_conversation(session_id).await?;
        let config = self.config.config()?;
        let system_prompt = prompt::system_prompt(&config);

        let mut answer = self
            .llm
            .send(system_prompt, &conversation.history, message)
            .await
            .inspect_err(|e| tracing::error!(session = %session_id, error = %e, "LLM call failed"))?;

        if self.filter.is_tutorial(&answer) {
            tracing::warn!(
                session = %session_id,
                chars = answer.chars().count(),
                "answer looks like a tutorial, regenerating with stricter prompt"
            );
            answer = self
                .llm
                .send(
                    system_prompt,
                    &conversation.history,
                    &prompt::strict_retry_message(message),
                )
                .await
                .inspect_err(|e| tracing::error!(session = %session_id, error = %e, "LLM retry failed"))?;
        }

        let parsed = parse_response(&answer);
        if let Some(err) = &parsed.parse_error {
            tracing::warn!(session = %session_id, error = %err, "failed to parse JSON from LLM response");
        }

        conversation.history.push(ChatMessage::user(message));
        conversation
            .history
            .push(ChatMessage::assistant(parsed.message.clone()));
        if let Some(spec) = &parsed.specification {
            conversation.draft_specification = Some(spec.clone());
        }
        self.storage.update_conversation(conversation).await?;
        self.storage.commit().await?;

        Ok(TurnResponse {
            message: parsed.message,
            ready_to_generate: parsed.ready,
            draft_specification: parsed.specification,
        })
    }

    /// Start a session whose draft is `spec`, without asking the LLM.
    pub async fn import_draft(
        &self,
        actor: &Actor,
        spec: FormSpec,
    ) -> Result<ImportedDraft, EngineError> {
        let issues = validate(&spec);
        let conversation = ConversationRecord {
            id: new_id(),
            owner: actor.name.clone(),
            template: DEFAULT_TEMPLATE.to_string(),
            state: "active".to_string(),
            history: Vec::new(),
            draft_specification: Some(spec),
            created_at: timestamp(),
        };
        let session_id = conversation.id.clone();
        self.storage.insert_conversation(conversation).await?;
        self.storage.commit().await?;
        Ok(ImportedDraft { session_id, issues })
    }

    pub async fn conversation(&self, session_id: &str) -> Result<ConversationRecord, EngineError> {
        Ok(self.storage.get_conversation(session_id).await?)
    }
}

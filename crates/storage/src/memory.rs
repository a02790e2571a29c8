//! In-memory `FormStorage` backend with optional JSON file persistence.
//!
//! State lives behind a mutex that is never held across an await point.
//! When opened on a path, every [`commit`](FormStorage::commit) rewrites the
//! whole state to that file (temp file + rename, so readers never see a
//! partial write).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RecordKind, StorageError};
use crate::record::{
    ArtifactRecord, ArtifactStatus, AuditEntry, ConversationRecord, PublicFormRecord,
    SchemaRecord, SubmissionRecord,
};
use crate::traits::FormStorage;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct State {
    #[serde(default)]
    schemas: BTreeMap<String, SchemaRecord>,
    #[serde(default)]
    public_forms: BTreeMap<String, PublicFormRecord>,
    #[serde(default)]
    artifacts: BTreeMap<String, ArtifactRecord>,
    #[serde(default)]
    conversations: BTreeMap<String, ConversationRecord>,
    #[serde(default)]
    audit: Vec<AuditEntry>,
    #[serde(default)]
    submissions: Vec<SubmissionRecord>,
}

/// A `FormStorage` kept in memory, optionally mirrored to a JSON file.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
    path: Option<PathBuf>,
}

impl MemoryStorage {
    /// A purely in-memory store; `commit` is a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a file-backed store, loading existing state when the file exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(src) => serde_json::from_str(&src).map_err(|e| {
                StorageError::Backend(format!("corrupt store '{}': {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => State::default(),
            Err(e) => {
                return Err(StorageError::Backend(format!(
                    "failed to read store '{}': {}",
                    path.display(),
                    e
                )))
            }
        };
        Ok(MemoryStorage {
            state: Mutex::new(state),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StorageError> {
        self.state
            .lock()
            .map_err(|_| StorageError::Backend("store state lock poisoned".to_string()))
    }
}

#[async_trait]
impl FormStorage for MemoryStorage {
    async fn schema_exists(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.lock()?.schemas.contains_key(name))
    }

    async fn schema_route_taken(
        &self,
        route: &str,
        except_schema: &str,
    ) -> Result<bool, StorageError> {
        Ok(self
            .lock()?
            .schemas
            .values()
            .any(|s| s.name != except_schema && s.route.as_deref() == Some(route)))
    }

    async fn insert_schema(&self, schema: SchemaRecord) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        if state.schemas.contains_key(&schema.name) {
            return Err(StorageError::duplicate(RecordKind::Schema, schema.name));
        }
        state.schemas.insert(schema.name.clone(), schema);
        Ok(())
    }

    async fn get_schema(&self, name: &str) -> Result<SchemaRecord, StorageError> {
        self.lock()?
            .schemas
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::not_found(RecordKind::Schema, name))
    }

    async fn update_schema(&self, schema: SchemaRecord) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        match state.schemas.get_mut(&schema.name) {
            Some(slot) => {
                *slot = schema;
                Ok(())
            }
            None => Err(StorageError::not_found(RecordKind::Schema, schema.name)),
        }
    }

    async fn count_schemas(&self) -> Result<usize, StorageError> {
        Ok(self.lock()?.schemas.len())
    }

    async fn public_form_for_schema(
        &self,
        schema_name: &str,
    ) -> Result<Option<PublicFormRecord>, StorageError> {
        Ok(self
            .lock()?
            .public_forms
            .values()
            .find(|f| f.backing_schema == schema_name)
            .cloned())
    }

    async fn form_route_taken(&self, route: &str) -> Result<bool, StorageError> {
        Ok(self
            .lock()?
            .public_forms
            .values()
            .any(|f| f.route == route))
    }

    async fn insert_public_form(&self, form: PublicFormRecord) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        if state.public_forms.contains_key(&form.name) {
            return Err(StorageError::duplicate(RecordKind::PublicForm, form.name));
        }
        if state
            .public_forms
            .values()
            .any(|f| f.backing_schema == form.backing_schema)
        {
            return Err(StorageError::duplicate(
                RecordKind::PublicForm,
                format!("form for schema {}", form.backing_schema),
            ));
        }
        state.public_forms.insert(form.name.clone(), form);
        Ok(())
    }

    async fn list_public_forms(&self) -> Result<Vec<PublicFormRecord>, StorageError> {
        Ok(self.lock()?.public_forms.values().cloned().collect())
    }

    async fn insert_artifact(&self, artifact: ArtifactRecord) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        if state.artifacts.contains_key(&artifact.id) {
            return Err(StorageError::duplicate(RecordKind::Artifact, artifact.id));
        }
        state.artifacts.insert(artifact.id.clone(), artifact);
        Ok(())
    }

    async fn get_artifact(&self, id: &str) -> Result<ArtifactRecord, StorageError> {
        self.lock()?
            .artifacts
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(RecordKind::Artifact, id))
    }

    async fn update_artifact(&self, artifact: ArtifactRecord) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        match state.artifacts.get_mut(&artifact.id) {
            Some(slot) => {
                *slot = artifact;
                Ok(())
            }
            None => Err(StorageError::not_found(RecordKind::Artifact, artifact.id)),
        }
    }

    async fn list_artifacts(
        &self,
        status: Option<ArtifactStatus>,
    ) -> Result<Vec<ArtifactRecord>, StorageError> {
        Ok(self
            .lock()?
            .artifacts
            .values()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect())
    }

    async fn insert_conversation(
        &self,
        conversation: ConversationRecord,
    ) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        if state.conversations.contains_key(&conversation.id) {
            return Err(StorageError::duplicate(
                RecordKind::Conversation,
                conversation.id,
            ));
        }
        state
            .conversations
            .insert(conversation.id.clone(), conversation);
        Ok(())
    }

    async fn get_conversation(&self, id: &str) -> Result<ConversationRecord, StorageError> {
        self.lock()?
            .conversations
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(RecordKind::Conversation, id))
    }

    async fn update_conversation(
        &self,
        conversation: ConversationRecord,
    ) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        match state.conversations.get_mut(&conversation.id) {
            Some(slot) => {
                *slot = conversation;
                Ok(())
            }
            None => Err(StorageError::not_found(
                RecordKind::Conversation,
                conversation.id,
            )),
        }
    }

    async fn append_audit(&self, entry: AuditEntry) -> Result<(), StorageError> {
        self.lock()?.audit.push(entry);
        Ok(())
    }

    async fn list_audit(
        &self,
        artifact_id: Option<&str>,
    ) -> Result<Vec<AuditEntry>, StorageError> {
        Ok(self
            .lock()?
            .audit
            .iter()
            .filter(|e| artifact_id.map_or(true, |id| e.artifact_id == id))
            .cloned()
            .collect())
    }

    async fn insert_submission(&self, submission: SubmissionRecord) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        if state.submissions.iter().any(|s| s.id == submission.id) {
            return Err(StorageError::duplicate(RecordKind::Submission, submission.id));
        }
        state.submissions.push(submission);
        Ok(())
    }

    async fn count_submissions(&self, schema_name: &str) -> Result<usize, StorageError> {
        Ok(self
            .lock()?
            .submissions
            .iter()
            .filter(|s| s.schema_name == schema_name)
            .count())
    }

    async fn list_submissions(
        &self,
        schema_name: &str,
    ) -> Result<Vec<SubmissionRecord>, StorageError> {
        Ok(self
            .lock()?
            .submissions
            .iter()
            .filter(|s| s.schema_name == schema_name)
            .cloned()
            .collect())
    }

    async fn commit(&self) -> Result<(), StorageError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        let serialized = {
            let state = self.lock()?;
            serde_json::to_string_pretty(&*state)
                .map_err(|e| StorageError::Backend(format!("failed to serialize store: {}", e)))?
        };
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, serialized).await.map_err(|e| {
            StorageError::Backend(format!("failed to write '{}': {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, path).await.map_err(|e| {
            StorageError::Backend(format!("failed to replace '{}': {}", path.display(), e))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ArtifactStatus, NamingRule};
    use formsmith_core::{FieldSpec, FieldType, FormSpec};

    fn schema(name: &str) -> SchemaRecord {
        SchemaRecord {
            name: name.to_string(),
            module: "Website".to_string(),
            custom: true,
            naming_rule: NamingRule::Autoincrement,
            is_submittable: false,
            track_changes: true,
            has_web_view: false,
            allow_guest_to_view: false,
            allow_guest_to_write: false,
            route: None,
            description: String::new(),
            fields: vec![],
            permissions: vec![],
            source_artifact: None,
        }
    }

    fn artifact(id: &str) -> ArtifactRecord {
        ArtifactRecord {
            id: id.to_string(),
            artifact_name: "Survey".to_string(),
            specification: FormSpec::new("Survey", vec![FieldSpec::new("q", FieldType::Data)]),
            status: ArtifactStatus::Draft,
            session_id: None,
            created_by: "tester".to_string(),
            approved_by: None,
            rejection_reason: None,
            backing_schema: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn commit_without_path_is_a_no_op() {
        let store = MemoryStorage::new();
        store.insert_schema(schema("A")).await.unwrap();
        store.commit().await.unwrap();
        assert!(store.path().is_none());
    }

    #[tokio::test]
    async fn committed_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = MemoryStorage::open(&path).await.unwrap();
        store.insert_schema(schema("Survey")).await.unwrap();
        store.insert_artifact(artifact("art-1")).await.unwrap();
        store.commit().await.unwrap();

        let reopened = MemoryStorage::open(&path).await.unwrap();
        assert!(reopened.schema_exists("Survey").await.unwrap());
        let a = reopened.get_artifact("art-1").await.unwrap();
        assert_eq!(a.specification.name.as_deref(), Some("Survey"));
    }

    #[tokio::test]
    async fn uncommitted_state_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = MemoryStorage::open(&path).await.unwrap();
        store.insert_schema(schema("Survey")).await.unwrap();
        drop(store);

        let reopened = MemoryStorage::open(&path).await.unwrap();
        assert!(!reopened.schema_exists("Survey").await.unwrap());
    }

    #[tokio::test]
    async fn corrupt_store_file_is_a_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();
        match MemoryStorage::open(&path).await {
            Err(StorageError::Backend(msg)) => assert!(msg.contains("corrupt store")),
            other => panic!("expected Backend error, got {:?}", other.map(|_| ())),
        }
    }
}

use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::{
    ArtifactRecord, ArtifactStatus, AuditEntry, ConversationRecord, PublicFormRecord,
    SchemaRecord, SubmissionRecord,
};

/// The persistence boundary for Formsmith.
///
/// A `FormStorage` implementation stores schemas, public forms, artifacts,
/// conversations, the audit trail and form submissions.
///
/// ## Durability
///
/// Mutating methods make their change visible to subsequent reads on the same
/// instance immediately. [`commit`](FormStorage::commit) is the durability
/// checkpoint: callers invoke it after every persistence step, and a backend
/// that persists out of process MUST make all prior mutations durable before
/// returning `Ok`.
///
/// ## Uniqueness
///
/// Callers check existence before creating records, but that is a
/// check-then-act race. Backends MUST reject duplicates themselves:
/// `insert_schema` on an existing name and `insert_public_form` on an
/// existing form name or an already-bound schema return
/// `Err(StorageError::Duplicate)`.
///
/// ## Permissions
///
/// The store performs no access control. Capability checks belong to the
/// caller.
#[async_trait]
pub trait FormStorage: Send + Sync + 'static {
    // ── Schemas ──────────────────────────────────────────────────────────────

    async fn schema_exists(&self, name: &str) -> Result<bool, StorageError>;

    /// Whether a schema other than `except_schema` serves `route`.
    async fn schema_route_taken(
        &self,
        route: &str,
        except_schema: &str,
    ) -> Result<bool, StorageError>;

    /// Returns `Err(StorageError::Duplicate)` if the name is taken.
    async fn insert_schema(&self, schema: SchemaRecord) -> Result<(), StorageError>;

    /// Returns `Err(StorageError::NotFound)` if the schema does not exist.
    async fn get_schema(&self, name: &str) -> Result<SchemaRecord, StorageError>;

    /// Replace a stored schema. Returns `Err(StorageError::NotFound)` if absent.
    async fn update_schema(&self, schema: SchemaRecord) -> Result<(), StorageError>;

    async fn count_schemas(&self) -> Result<usize, StorageError>;

    // ── Public forms ─────────────────────────────────────────────────────────

    /// The public form bound to `schema_name`, if any.
    async fn public_form_for_schema(
        &self,
        schema_name: &str,
    ) -> Result<Option<PublicFormRecord>, StorageError>;

    async fn form_route_taken(&self, route: &str) -> Result<bool, StorageError>;

    async fn insert_public_form(&self, form: PublicFormRecord) -> Result<(), StorageError>;

    async fn list_public_forms(&self) -> Result<Vec<PublicFormRecord>, StorageError>;

    // ── Artifacts ────────────────────────────────────────────────────────────

    /// Returns `Err(StorageError::Duplicate)` if the id is taken.
    async fn insert_artifact(&self, artifact: ArtifactRecord) -> Result<(), StorageError>;

    async fn get_artifact(&self, id: &str) -> Result<ArtifactRecord, StorageError>;

    async fn update_artifact(&self, artifact: ArtifactRecord) -> Result<(), StorageError>;

    /// List artifacts ordered by id, optionally filtered by status.
    async fn list_artifacts(
        &self,
        status: Option<ArtifactStatus>,
    ) -> Result<Vec<ArtifactRecord>, StorageError>;

    // ── Conversations ────────────────────────────────────────────────────────

    async fn insert_conversation(
        &self,
        conversation: ConversationRecord,
    ) -> Result<(), StorageError>;

    async fn get_conversation(&self, id: &str) -> Result<ConversationRecord, StorageError>;

    async fn update_conversation(
        &self,
        conversation: ConversationRecord,
    ) -> Result<(), StorageError>;

    // ── Audit trail (append-only) ────────────────────────────────────────────

    async fn append_audit(&self, entry: AuditEntry) -> Result<(), StorageError>;

    /// Audit entries in append order, optionally for one artifact.
    async fn list_audit(&self, artifact_id: Option<&str>)
        -> Result<Vec<AuditEntry>, StorageError>;

    // ── Submissions ──────────────────────────────────────────────────────────

    async fn insert_submission(&self, submission: SubmissionRecord) -> Result<(), StorageError>;

    async fn count_submissions(&self, schema_name: &str) -> Result<usize, StorageError>;

    async fn list_submissions(
        &self,
        schema_name: &str,
    ) -> Result<Vec<SubmissionRecord>, StorageError>;

    // ── Durability ───────────────────────────────────────────────────────────

    /// Make every mutation so far durable.
    async fn commit(&self) -> Result<(), StorageError>;
}

use std::collections::BTreeMap;
use std::fmt;

use formsmith_core::{FieldType, FormSpec};
use serde::{Deserialize, Serialize};

// ── Schemas ──────────────────────────────────────────────────────────────────

/// How records of a synthesized schema are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum NamingRule {
    Autoincrement,
    /// Naming series in host placeholder syntax, e.g. `ONB-.#####`.
    NamingSeries { pattern: String },
}

/// One field of a persisted schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub fieldname: Option<String>,
    pub label: Option<String>,
    pub fieldtype: FieldType,
    pub mandatory: bool,
    pub hidden: bool,
    pub read_only: bool,
    pub in_list_view: bool,
    pub in_standard_filter: bool,
    pub options: Option<String>,
    pub default: Option<String>,
    pub description: Option<String>,
    pub depends_on: Option<String>,
    /// 1-based position within the schema.
    pub idx: u32,
}

/// A role grant on a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub role: String,
    pub read: bool,
    pub write: bool,
    pub create: bool,
    pub submit: bool,
    pub cancel: bool,
    pub amend: bool,
}

/// A record-type definition compiled from a specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRecord {
    /// Unique schema name.
    pub name: String,
    pub module: String,
    pub custom: bool,
    pub naming_rule: NamingRule,
    pub is_submittable: bool,
    pub track_changes: bool,
    pub has_web_view: bool,
    pub allow_guest_to_view: bool,
    pub allow_guest_to_write: bool,
    /// Public web path, when the schema serves its own web view.
    pub route: Option<String>,
    pub description: String,
    pub fields: Vec<SchemaField>,
    pub permissions: Vec<Permission>,
    /// Artifact the schema was compiled from.
    pub source_artifact: Option<String>,
}

// ── Public forms ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicFormField {
    pub fieldname: String,
    pub label: Option<String>,
    pub fieldtype: FieldType,
    pub mandatory: bool,
    pub options: Option<String>,
    pub description: Option<String>,
    pub idx: u32,
}

/// A public submission form bound to at most one schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicFormRecord {
    /// Unique form name; equal to the route.
    pub name: String,
    pub title: String,
    pub backing_schema: String,
    pub module: String,
    pub route: String,
    pub login_required: bool,
    pub allow_multiple: bool,
    pub published: bool,
    pub visit_link: String,
    pub fields: Vec<PublicFormField>,
}

// ── Artifacts ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    Draft,
    Approved,
    Rejected,
}

impl fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactStatus::Draft => "draft",
            ArtifactStatus::Approved => "approved",
            ArtifactStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// A tracked proposal holding a frozen copy of one specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub id: String,
    /// Requested schema name at the time the artifact was created.
    pub artifact_name: String,
    pub specification: FormSpec,
    pub status: ArtifactStatus,
    pub session_id: Option<String>,
    pub created_by: String,
    pub approved_by: Option<String>,
    pub rejection_reason: Option<String>,
    /// Name of the schema actually created, once it exists.
    pub backing_schema: Option<String>,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub created_at: String,
}

// ── Conversations ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: String,
    pub owner: String,
    pub template: String,
    /// Lifecycle marker; conversations are created `active` and never closed.
    pub state: String,
    pub history: Vec<ChatMessage>,
    pub draft_specification: Option<FormSpec>,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub created_at: String,
}

// ── Audit ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Generate,
    Approved,
    Rejected,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuditAction::Generate => "generate",
            AuditAction::Approved => "approved",
            AuditAction::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// An immutable record of one artifact lifecycle action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub action: AuditAction,
    pub artifact_id: String,
    pub artifact_name: String,
    pub actor: String,
    pub reason: Option<String>,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub recorded_at: String,
}

// ── Submissions ──────────────────────────────────────────────────────────────

/// A record of one public form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: String,
    pub form_name: String,
    pub schema_name: String,
    pub submitted_by: String,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub submitted_at: String,
    pub data: BTreeMap<String, String>,
    pub status: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

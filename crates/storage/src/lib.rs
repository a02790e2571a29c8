//! formsmith-storage: the persistence boundary for Formsmith.
//!
//! Defines the [`FormStorage`] trait, the record types it stores, a
//! JSON-file-backed [`MemoryStorage`] backend and a backend-agnostic
//! [`conformance`] suite.

pub mod conformance;
mod error;
mod memory;
mod record;
mod traits;

pub use error::{RecordKind, StorageError};
pub use memory::MemoryStorage;
pub use record::{
    ArtifactRecord, ArtifactStatus, AuditAction, AuditEntry, ChatMessage, ConversationRecord,
    NamingRule, Permission, PublicFormField, PublicFormRecord, Role, SchemaField, SchemaRecord,
    SubmissionRecord,
};
pub use traits::FormStorage;

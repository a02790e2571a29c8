use std::fmt;

/// The kinds of record a storage backend holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Schema,
    PublicForm,
    Artifact,
    Conversation,
    Submission,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordKind::Schema => "schema",
            RecordKind::PublicForm => "public form",
            RecordKind::Artifact => "artifact",
            RecordKind::Conversation => "conversation",
            RecordKind::Submission => "submission",
        };
        f.write_str(s)
    }
}

/// All errors that can be returned by a FormStorage implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No record with the given key.
    #[error("{kind} not found: {key}")]
    NotFound { kind: RecordKind, key: String },

    /// A record with this key (or another unique attribute) already exists.
    /// Uniqueness is the store's to enforce; callers only check beforehand.
    #[error("{kind} already exists: {key}")]
    Duplicate { kind: RecordKind, key: String },

    /// A backend-specific storage error (I/O, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn not_found(kind: RecordKind, key: impl Into<String>) -> Self {
        StorageError::NotFound {
            kind,
            key: key.into(),
        }
    }

    pub fn duplicate(kind: RecordKind, key: impl Into<String>) -> Self {
        StorageError::Duplicate {
            kind,
            key: key.into(),
        }
    }
}

use std::fmt;

use formsmith_core::ValidationIssue;
use formsmith_storage::{RecordKind, StorageError};

use crate::config::ConfigError;
use crate::llm::LlmError;

/// Coarse error taxonomy exposed to callers that only need to decide how to
/// report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Permission,
    NotFound,
    Provider,
    Conflict,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Permission => "permission",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Provider => "provider",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Errors returned by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The specification breaks one or more validation rules.
    #[error("Specification validation failed:\n{}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("No draft specification found. Continue the conversation to generate a form.")]
    NoDraft,

    /// The actor lacks the capability the operation requires.
    #[error("{0}")]
    Permission(String),

    #[error("{kind} not found: {key}")]
    NotFound { kind: RecordKind, key: String },

    /// The artifact is not in a state that allows the requested transition.
    #[error("{0}")]
    InvalidTransition(String),

    #[error(transparent)]
    Provider(#[from] LlmError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The store rejected a duplicate name or route.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Storage(String),
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Validation(_) | EngineError::NoDraft | EngineError::InvalidTransition(_) => {
                ErrorKind::Validation
            }
            EngineError::Permission(_) => ErrorKind::Permission,
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::Provider(_) | EngineError::Config(_) => ErrorKind::Provider,
            EngineError::Conflict(_) => ErrorKind::Conflict,
            EngineError::Storage(_) => ErrorKind::Internal,
        }
    }
}

impl From<StorageError> for EngineError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { kind, key } => EngineError::NotFound { kind, key },
            e @ StorageError::Duplicate { .. } => EngineError::Conflict(e.to_string()),
            StorageError::Backend(msg) => EngineError::Storage(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formsmith_core::ValidationRule;

    #[test]
    fn storage_errors_map_onto_the_taxonomy() {
        let nf: EngineError = StorageError::not_found(RecordKind::Artifact, "a-1").into();
        assert_eq!(nf.kind(), ErrorKind::NotFound);
        assert_eq!(nf.to_string(), "artifact not found: a-1");

        let dup: EngineError = StorageError::duplicate(RecordKind::Schema, "Survey").into();
        assert_eq!(dup.kind(), ErrorKind::Conflict);

        let backend: EngineError = StorageError::Backend("disk full".into()).into();
        assert_eq!(backend.kind(), ErrorKind::Internal);
    }

    #[test]
    fn validation_error_lists_every_issue() {
        let err = EngineError::Validation(vec![
            ValidationIssue {
                field: None,
                rule: ValidationRule::MissingName,
                message: "Form name is required".into(),
            },
            ValidationIssue {
                field: None,
                rule: ValidationRule::MissingFields,
                message: "Fields array is required".into(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Specification validation failed:\nForm name is required\nFields array is required"
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

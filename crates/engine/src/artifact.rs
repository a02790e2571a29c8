//! Artifact lifecycle: generate, approve, reject.
//!
//! ```text
//! generate ──publish──▶ approved
//!    │
//!    └──────────────▶ draft ──approve──▶ approved
//!                       │
//!                       └────reject───▶ rejected
//! ```
//!
//! `approved` and `rejected` are terminal.

use formsmith_core::validate;
use formsmith_storage::{ArtifactRecord, ArtifactStatus, AuditAction, FormStorage};
use serde::Serialize;

use crate::actor::Actor;
use crate::error::EngineError;
use crate::service::{new_id, timestamp, Engine};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateResponse {
    pub artifact_id: String,
    /// The created schema's name when published, otherwise the requested name.
    pub schema_name: String,
    pub module: Option<String>,
    pub status: ArtifactStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalResponse {
    pub message: String,
    pub schema_name: Option<String>,
    pub form_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectionResponse {
    pub message: String,
    pub artifact_id: String,
}

impl<S: FormStorage> Engine<S> {
    /// Freeze the session's draft into an artifact. With `publish`, the
    /// schema is created immediately and the artifact starts `approved`.
    pub async fn generate(
        &self,
        session_id: &str,
        publish: bool,
        actor: &Actor,
    ) -> Result<GenerateResponse, EngineError> {
        let conversation = self.storage.get_conversation(session_id).await?;
        let spec = conversation.draft_specification.ok_or(EngineError::NoDraft)?;
        let issues = validate(&spec);
        if !issues.is_empty() {
            return Err(EngineError::Validation(issues));
        }
        let requested = spec.name.clone().unwrap_or_default();
        let module = spec.module.clone();
        let artifact_id = new_id();

        let (backing_schema, notices) = if publish {
            let synthesis = self.synthesize(&spec, &artifact_id).await?;
            (Some(synthesis.schema.name), synthesis.notices)
        } else {
            (None, Vec::new())
        };

        let status = if publish {
            ArtifactStatus::Approved
        } else {
            ArtifactStatus::Draft
        };
        let artifact = ArtifactRecord {
            id: artifact_id.clone(),
            artifact_name: requested.clone(),
            specification: spec,
            status,
            session_id: Some(session_id.to_string()),
            created_by: actor.name.clone(),
            approved_by: None,
            rejection_reason: None,
            backing_schema: backing_schema.clone(),
            created_at: timestamp(),
        };
        self.storage.insert_artifact(artifact).await?;
        self.storage.commit().await?;
        tracing::info!(artifact = %artifact_id, %status, actor = %actor.name, "artifact generated");

        self.record_audit(AuditAction::Generate, &artifact_id, &requested, actor, None)
            .await;

        Ok(GenerateResponse {
            artifact_id,
            schema_name: backing_schema.unwrap_or(requested),
            module,
            status,
            message: if publish {
                "Schema generated successfully".to_string()
            } else {
                "Draft saved for admin review".to_string()
            },
            notices,
        })
    }

    /// Approve a draft artifact: create its schema if needed, then derive the
    /// public form. A form failure is logged and does not fail the approval.
    pub async fn approve(
        &self,
        artifact_id: &str,
        actor: &Actor,
    ) -> Result<ApprovalResponse, EngineError> {
        if !actor.can_write_artifacts {
            return Err(EngineError::Permission(
                "Insufficient permissions to approve artifacts".to_string(),
            ));
        }
        let mut artifact = self.storage.get_artifact(artifact_id).await?;
        match artifact.status {
            ArtifactStatus::Draft => {}
            ArtifactStatus::Approved => {
                return Err(EngineError::InvalidTransition(
                    "Artifact is already approved".to_string(),
                ))
            }
            ArtifactStatus::Rejected => {
                return Err(EngineError::InvalidTransition(
                    "Artifact was rejected and cannot be approved".to_string(),
                ))
            }
        }

        let mut notices = Vec::new();
        let schema_name = match artifact.backing_schema.as_deref() {
            Some(name) if self.storage.schema_exists(name).await? => name.to_string(),
            _ => {
                let synthesis = self.synthesize(&artifact.specification, artifact_id).await?;
                notices = synthesis.notices;
                synthesis.schema.name
            }
        };

        let form_route = match self.derive_form(&schema_name).await {
            Ok(derived) => Some(derived.form.route),
            Err(e) => {
                tracing::warn!(
                    schema = %schema_name,
                    artifact = %artifact_id,
                    error = %e,
                    "public form creation failed; approval continues"
                );
                None
            }
        };

        artifact.status = ArtifactStatus::Approved;
        artifact.approved_by = Some(actor.name.clone());
        artifact.backing_schema = Some(schema_name.clone());
        let artifact_name = artifact.artifact_name.clone();
        self.storage.update_artifact(artifact).await?;
        self.storage.commit().await?;
        tracing::info!(artifact = %artifact_id, schema = %schema_name, actor = %actor.name, "artifact approved");

        self.record_audit(AuditAction::Approved, artifact_id, &artifact_name, actor, None)
            .await;

        let mut message = "Artifact approved and schema created successfully".to_string();
        if form_route.is_some() {
            message.push_str(" Public form created for public access.");
        }
        Ok(ApprovalResponse {
            message,
            schema_name: Some(schema_name),
            form_url: form_route.map(|r| format!("/{}", r)),
            notices,
        })
    }

    /// Reject a draft artifact, recording an optional reason.
    pub async fn reject(
        &self,
        artifact_id: &str,
        reason: Option<&str>,
        actor: &Actor,
    ) -> Result<RejectionResponse, EngineError> {
        if !actor.can_write_artifacts {
            return Err(EngineError::Permission(
                "Insufficient permissions to reject artifacts".to_string(),
            ));
        }
        let mut artifact = self.storage.get_artifact(artifact_id).await?;
        if artifact.status != ArtifactStatus::Draft {
            return Err(EngineError::InvalidTransition(format!(
                "Artifact is already {}",
                artifact.status
            )));
        }

        artifact.status = ArtifactStatus::Rejected;
        artifact.rejection_reason = reason.map(str::to_string);
        let artifact_name = artifact.artifact_name.clone();
        self.storage.update_artifact(artifact).await?;
        self.storage.commit().await?;
        tracing::info!(artifact = %artifact_id, actor = %actor.name, "artifact rejected");

        self.record_audit(AuditAction::Rejected, artifact_id, &artifact_name, actor, reason)
            .await;

        Ok(RejectionResponse {
            message: "Artifact rejected".to_string(),
            artifact_id: artifact_id.to_string(),
        })
    }

    pub async fn approved_artifacts(&self) -> Result<Vec<ArtifactRecord>, EngineError> {
        self.artifacts(Some(ArtifactStatus::Approved)).await
    }

    pub async fn artifacts(
        &self,
        status: Option<ArtifactStatus>,
    ) -> Result<Vec<ArtifactRecord>, EngineError> {
        Ok(self.storage.list_artifacts(status).await?)
    }

    pub async fn artifact(&self, artifact_id: &str) -> Result<ArtifactRecord, EngineError> {
        Ok(self.storage.get_artifact(artifact_id).await?)
    }
}

use formsmith_storage::{AuditAction, AuditEntry, FormStorage};

use crate::actor::Actor;
use crate::error::EngineError;
use crate::service::{timestamp, Engine};

impl<S: FormStorage> Engine<S> {
    /// Append one audit entry. Failures are logged and swallowed.
    pub(crate) async fn record_audit(
        &self,
        action: AuditAction,
        artifact_id: &str,
        artifact_name: &str,
        actor: &Actor,
        reason: Option<&str>,
    ) {
        let entry = AuditEntry {
            action,
            artifact_id: artifact_id.to_string(),
            artifact_name: artifact_name.to_string(),
            actor: actor.name.clone(),
            reason: reason.map(str::to_string),
            recorded_at: timestamp(),
        };
        let result = async {
            self.storage.append_audit(entry).await?;
            self.storage.commit().await
        }
        .await;
        if let Err(e) = result {
            tracing::warn!(%action, artifact = %artifact_id, error = %e, "failed to record audit entry");
        }
    }

    /// Audit entries in the order they were recorded.
    pub async fn audit_trail(&self, artifact_id: Option<&str>) -> Result<Vec<AuditEntry>, EngineError> {
        Ok(self.storage.list_audit(artifact_id).await?)
    }
}

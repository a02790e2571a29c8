//! Submission tracking for public forms.

use std::collections::BTreeMap;

use formsmith_storage::{FormStorage, PublicFormRecord, SubmissionRecord};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::actor::Actor;
use crate::error::EngineError;
use crate::service::{new_id, timestamp, Engine};

/// Recorded as the submitter for guest submissions.
pub const ANONYMOUS: &str = "Anonymous";

/// Where a submission came from.
#[derive(Debug, Clone, Default)]
pub struct SubmissionOrigin {
    /// Only submissions made through a public form are tracked.
    pub via_public_form: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A public form with the number of submissions it has received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicFormSummary {
    #[serde(flatten)]
    pub form: PublicFormRecord,
    pub submission_count: usize,
}

impl<S: FormStorage> Engine<S> {
    /// Record a submission to `schema_name`'s public form.
    ///
    /// Returns `None` when the submission is not tracked (not made through a
    /// public form, or the schema has none) and when recording fails; failures
    /// are logged, never raised.
    pub async fn track_submission(
        &self,
        schema_name: &str,
        values: &Map<String, Value>,
        submitter: Option<&Actor>,
        origin: &SubmissionOrigin,
    ) -> Option<SubmissionRecord> {
        if !origin.via_public_form {
            return None;
        }
        match self.try_track(schema_name, values, submitter, origin).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(schema = %schema_name, error = %e, "failed to track submission");
                None
            }
        }
    }

    async fn try_track(
        &self,
        schema_name: &str,
        values: &Map<String, Value>,
        submitter: Option<&Actor>,
        origin: &SubmissionOrigin,
    ) -> Result<Option<SubmissionRecord>, EngineError> {
        let Some(form) = self.storage.public_form_for_schema(schema_name).await? else {
            return Ok(None);
        };
        let submitted_by = match submitter {
            Some(actor) if !actor.is_guest() => actor.name.clone(),
            _ => ANONYMOUS.to_string(),
        };
        let record = SubmissionRecord {
            id: new_id(),
            form_name: form.name,
            schema_name: schema_name.to_string(),
            submitted_by,
            submitted_at: timestamp(),
            data: submission_data(values),
            status: "New".to_string(),
            ip_address: origin.ip_address.clone(),
            user_agent: origin.user_agent.clone(),
        };
        self.storage.insert_submission(record.clone()).await?;
        self.storage.commit().await?;
        tracing::info!(schema = %schema_name, submission = %record.id, "submission tracked");
        Ok(Some(record))
    }

    /// Every public form with its submission count.
    pub async fn public_forms(&self) -> Result<Vec<PublicFormSummary>, EngineError> {
        let forms = self.storage.list_public_forms().await?;
        let mut summaries = Vec::with_capacity(forms.len());
        for form in forms {
            let submission_count = self.storage.count_submissions(&form.backing_schema).await?;
            summaries.push(PublicFormSummary {
                form,
                submission_count,
            });
        }
        Ok(summaries)
    }
}

/// Stringify submitted values, dropping the record name and nulls.
pub fn submission_data(values: &Map<String, Value>) -> BTreeMap<String, String> {
    values
        .iter()
        .filter(|(key, value)| key.as_str() != "name" && !value.is_null())
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

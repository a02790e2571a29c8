mod common;

use std::sync::Arc;

use common::{engine, feedback_spec};
use formsmith_core::{FieldSpec, FieldType, FormSpec};
use formsmith_engine::{Actor, EngineError, ErrorKind, SubmissionOrigin};
use formsmith_storage::{
    ArtifactStatus, AuditAction, FormStorage, PublicFormRecord, StorageError,
};
use serde_json::json;

fn admin() -> Actor {
    Actor::administrator()
}

#[tokio::test]
async fn feedback_scenario_synthesizes_route_and_fields() {
    let engine = engine();
    let synthesis = engine.synthesize(&feedback_spec(), "art-1").await.unwrap();
    let schema = synthesis.schema;
    assert_eq!(schema.name, "Customer Feedback");
    assert_eq!(schema.route.as_deref(), Some("customer-feedback"));
    assert_eq!(schema.fields.len(), 3);
    assert_eq!(schema.fields[2].fieldname.as_deref(), Some("route"));
    assert!(synthesis.notices.is_empty());
    assert!(engine.storage().schema_exists("Customer Feedback").await.unwrap());
}

#[tokio::test]
async fn name_collisions_resolve_to_next_suffix() {
    let engine = engine();
    for _ in 0..3 {
        engine.synthesize(&feedback_spec(), "seed").await.unwrap();
    }
    // "X", "X 1", "X 2" now exist.
    let synthesis = engine.synthesize(&feedback_spec(), "art-4").await.unwrap();
    assert_eq!(synthesis.schema.name, "Customer Feedback 3");
    assert_eq!(
        synthesis.notices,
        vec!["A schema named 'Customer Feedback' already exists. Creating as 'Customer Feedback 3' instead."]
    );
    assert_eq!(synthesis.schema.route.as_deref(), Some("customer-feedback-3"));
}

#[tokio::test]
async fn route_collision_with_another_schema_is_suffixed() {
    let engine = engine();
    // "Customer-Feedback" slugs to the same route as "Customer Feedback".
    engine
        .synthesize(&FormSpec::new("Customer-Feedback", feedback_spec().fields.unwrap()), "a")
        .await
        .unwrap();
    let second = engine.synthesize(&feedback_spec(), "b").await.unwrap();
    assert_eq!(second.schema.name, "Customer Feedback");
    assert_eq!(second.schema.route.as_deref(), Some("customer-feedback-1"));
}

#[tokio::test]
async fn invalid_specification_is_not_synthesized() {
    let engine = engine();
    let spec = FormSpec::new("Bad", vec![FieldSpec::new("Full Name", FieldType::Data)]);
    let err = engine.synthesize(&spec, "a").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(engine.storage().count_schemas().await.unwrap(), 0);
}

#[tokio::test]
async fn derive_form_is_idempotent() {
    let engine = engine();
    engine.synthesize(&feedback_spec(), "a").await.unwrap();

    let first = engine.derive_form("Customer Feedback").await.unwrap();
    assert!(first.created);
    assert_eq!(first.form.route, "customer-feedback");
    assert_eq!(first.form.fields.len(), 2, "hidden route field is excluded");

    let schema = engine.storage().get_schema("Customer Feedback").await.unwrap();
    assert!(schema.route.is_none());
    assert!(!schema.has_web_view);
    assert_eq!(schema.permissions.len(), 1);

    let second = engine.derive_form("Customer Feedback").await.unwrap();
    assert!(!second.created);
    assert_eq!(second.form, first.form);
    assert_eq!(engine.storage().list_public_forms().await.unwrap().len(), 1);
    let schema = engine.storage().get_schema("Customer Feedback").await.unwrap();
    assert_eq!(schema.permissions.len(), 1, "second call changes nothing");
}

#[tokio::test]
async fn unfinished_hand_off_is_completed_on_next_derivation() {
    let engine = engine();
    engine.synthesize(&feedback_spec(), "a").await.unwrap();
    engine.derive_form("Customer Feedback").await.unwrap();

    // A schema whose form exists but whose hand-off never landed.
    let mut schema = engine.storage().get_schema("Customer Feedback").await.unwrap();
    schema.route = Some("customer-feedback".into());
    schema.has_web_view = true;
    engine.storage().update_schema(schema).await.unwrap();

    let again = engine.derive_form("Customer Feedback").await.unwrap();
    assert!(!again.created);
    let schema = engine.storage().get_schema("Customer Feedback").await.unwrap();
    assert!(schema.route.is_none());
    assert!(!schema.has_web_view);
    let guests = schema.permissions.iter().filter(|p| p.role == "Guest").count();
    assert_eq!(guests, 1);
}

#[tokio::test]
async fn form_route_avoids_existing_forms() {
    let engine = engine();
    engine
        .storage()
        .insert_public_form(PublicFormRecord {
            name: "customer-feedback".into(),
            title: "Legacy".into(),
            backing_schema: "Legacy".into(),
            module: "Website".into(),
            route: "customer-feedback".into(),
            login_required: false,
            allow_multiple: true,
            published: true,
            visit_link: "/customer-feedback".into(),
            fields: vec![],
        })
        .await
        .unwrap();
    engine.synthesize(&feedback_spec(), "a").await.unwrap();
    let derived = engine.derive_form("Customer Feedback").await.unwrap();
    assert_eq!(derived.form.route, "customer-feedback-1");
    assert_eq!(derived.form.visit_link, "/customer-feedback-1");
}

#[tokio::test]
async fn draft_generation_then_approval() {
    let engine = engine();
    let user = Actor::new("alice", false);
    let imported = engine.import_draft(&user, feedback_spec()).await.unwrap();
    assert!(imported.issues.is_empty());

    let generated = engine.generate(&imported.session_id, false, &user).await.unwrap();
    assert_eq!(generated.status, ArtifactStatus::Draft);
    assert_eq!(generated.message, "Draft saved for admin review");
    assert_eq!(generated.schema_name, "Customer Feedback");
    assert_eq!(engine.storage().count_schemas().await.unwrap(), 0);

    let err = engine.approve(&generated.artifact_id, &user).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Permission);

    let approval = engine.approve(&generated.artifact_id, &admin()).await.unwrap();
    assert_eq!(approval.schema_name.as_deref(), Some("Customer Feedback"));
    assert_eq!(approval.form_url.as_deref(), Some("/customer-feedback"));
    assert_eq!(
        approval.message,
        "Artifact approved and schema created successfully Public form created for public access."
    );

    let artifact = engine.artifact(&generated.artifact_id).await.unwrap();
    assert_eq!(artifact.status, ArtifactStatus::Approved);
    assert_eq!(artifact.approved_by.as_deref(), Some("Administrator"));
    assert_eq!(artifact.backing_schema.as_deref(), Some("Customer Feedback"));
    assert_eq!(artifact.created_by, "alice");

    let actions: Vec<AuditAction> = engine
        .audit_trail(Some(&generated.artifact_id))
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(actions, vec![AuditAction::Generate, AuditAction::Approved]);
}

#[tokio::test]
async fn published_generation_creates_schema_without_form() {
    let engine = engine();
    let session = engine.import_draft(&admin(), feedback_spec()).await.unwrap();
    let generated = engine.generate(&session.session_id, true, &admin()).await.unwrap();
    assert_eq!(generated.status, ArtifactStatus::Approved);
    assert_eq!(generated.message, "Schema generated successfully");
    assert!(engine.storage().schema_exists("Customer Feedback").await.unwrap());
    assert!(engine.storage().list_public_forms().await.unwrap().is_empty());

    let err = engine.approve(&generated.artifact_id, &admin()).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
    assert_eq!(err.to_string(), "Artifact is already approved");

    let approved = engine.approved_artifacts().await.unwrap();
    assert_eq!(approved.len(), 1);
}

#[tokio::test]
async fn generation_requires_a_valid_draft() {
    let engine = engine();
    let session = engine.start_session(&admin(), None).await.unwrap();
    let err = engine.generate(&session.session_id, false, &admin()).await.unwrap_err();
    assert!(matches!(err, EngineError::NoDraft));
    assert_eq!(
        err.to_string(),
        "No draft specification found. Continue the conversation to generate a form."
    );

    let bad = FormSpec::new("Bad", vec![FieldSpec::new("owner", FieldType::Data)]);
    let imported = engine.import_draft(&admin(), bad).await.unwrap();
    assert_eq!(imported.issues.len(), 1);
    let err = engine.generate(&imported.session_id, true, &admin()).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(engine.artifacts(None).await.unwrap().is_empty());

    let err = engine.generate("missing", false, &admin()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn rejection_is_terminal() {
    let engine = engine();
    let session = engine.import_draft(&admin(), feedback_spec()).await.unwrap();
    let generated = engine.generate(&session.session_id, false, &admin()).await.unwrap();

    let rejected = engine
        .reject(&generated.artifact_id, Some("Too vague"), &admin())
        .await
        .unwrap();
    assert_eq!(rejected.message, "Artifact rejected");

    let artifact = engine.artifact(&generated.artifact_id).await.unwrap();
    assert_eq!(artifact.status, ArtifactStatus::Rejected);
    assert_eq!(artifact.rejection_reason.as_deref(), Some("Too vague"));

    let err = engine.approve(&generated.artifact_id, &admin()).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
    let err = engine
        .reject(&generated.artifact_id, None, &admin())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Artifact is already rejected");
    assert_eq!(engine.storage().count_schemas().await.unwrap(), 0);

    let trail = engine.audit_trail(Some(&generated.artifact_id)).await.unwrap();
    assert_eq!(trail.last().unwrap().action, AuditAction::Rejected);
    assert_eq!(trail.last().unwrap().reason.as_deref(), Some("Too vague"));
}

#[tokio::test]
async fn unknown_artifact_is_not_found() {
    let engine = engine();
    let err = engine.approve("nope", &admin()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = engine.reject("nope", None, &admin()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn rejection_requires_write_capability() {
    let engine = engine();
    let session = engine.import_draft(&admin(), feedback_spec()).await.unwrap();
    let generated = engine.generate(&session.session_id, false, &admin()).await.unwrap();
    let err = engine
        .reject(&generated.artifact_id, None, &Actor::guest())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Permission);
}

#[tokio::test]
async fn artifact_keeps_a_frozen_copy_of_the_draft() {
    let engine = engine();
    let session = engine.import_draft(&admin(), feedback_spec()).await.unwrap();
    let generated = engine.generate(&session.session_id, false, &admin()).await.unwrap();

    let mut conv = engine.conversation(&session.session_id).await.unwrap();
    conv.draft_specification = Some(FormSpec::new(
        "Something Else",
        vec![FieldSpec::new("x", FieldType::Data)],
    ));
    engine.storage().update_conversation(conv).await.unwrap();

    let artifact = engine.artifact(&generated.artifact_id).await.unwrap();
    assert_eq!(artifact.specification, feedback_spec());
}

#[tokio::test]
async fn submissions_are_tracked_only_through_public_forms() {
    let engine = engine();
    let session = engine.import_draft(&admin(), feedback_spec()).await.unwrap();
    let generated = engine.generate(&session.session_id, false, &admin()).await.unwrap();
    engine.approve(&generated.artifact_id, &admin()).await.unwrap();

    let values = json!({"name": "CF-1", "customer_name": "Ada", "rating": 4, "comments": null});
    let values = values.as_object().unwrap();
    let origin = SubmissionOrigin {
        via_public_form: true,
        ip_address: Some("203.0.113.9".into()),
        user_agent: None,
    };

    let record = engine
        .track_submission("Customer Feedback", values, Some(&Actor::guest()), &origin)
        .await
        .unwrap();
    assert_eq!(record.submitted_by, "Anonymous");
    assert_eq!(record.status, "New");
    assert_eq!(record.form_name, "customer-feedback");
    assert_eq!(record.data.len(), 2);

    let desk = SubmissionOrigin::default();
    assert!(engine
        .track_submission("Customer Feedback", values, Some(&admin()), &desk)
        .await
        .is_none());
    assert!(engine
        .track_submission("No Such Schema", values, None, &origin)
        .await
        .is_none());

    let forms = engine.public_forms().await.unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].submission_count, 1);
}

/// Store whose public-form insert always fails.
struct NoForms(formsmith_storage::MemoryStorage);

#[async_trait::async_trait]
impl FormStorage for NoForms {
    async fn schema_exists(&self, name: &str) -> Result<bool, StorageError> {
        self.0.schema_exists(name).await
    }
    async fn schema_route_taken(&self, route: &str, except: &str) -> Result<bool, StorageError> {
        self.0.schema_route_taken(route, except).await
    }
    async fn insert_schema(&self, s: formsmith_storage::SchemaRecord) -> Result<(), StorageError> {
        self.0.insert_schema(s).await
    }
    async fn get_schema(&self, name: &str) -> Result<formsmith_storage::SchemaRecord, StorageError> {
        self.0.get_schema(name).await
    }
    async fn update_schema(&self, s: formsmith_storage::SchemaRecord) -> Result<(), StorageError> {
        self.0.update_schema(s).await
    }
    async fn count_schemas(&self) -> Result<usize, StorageError> {
        self.0.count_schemas().await
    }
    async fn public_form_for_schema(&self, n: &str) -> Result<Option<PublicFormRecord>, StorageError> {
        self.0.public_form_for_schema(n).await
    }
    async fn form_route_taken(&self, route: &str) -> Result<bool, StorageError> {
        self.0.form_route_taken(route).await
    }
    async fn insert_public_form(&self, _form: PublicFormRecord) -> Result<(), StorageError> {
        Err(StorageError::Backend("form table unavailable".into()))
    }
    async fn list_public_forms(&self) -> Result<Vec<PublicFormRecord>, StorageError> {
        self.0.list_public_forms().await
    }
    async fn insert_artifact(&self, a: formsmith_storage::ArtifactRecord) -> Result<(), StorageError> {
        self.0.insert_artifact(a).await
    }
    async fn get_artifact(&self, id: &str) -> Result<formsmith_storage::ArtifactRecord, StorageError> {
        self.0.get_artifact(id).await
    }
    async fn update_artifact(&self, a: formsmith_storage::ArtifactRecord) -> Result<(), StorageError> {
        self.0.update_artifact(a).await
    }
    async fn list_artifacts(
        &self,
        status: Option<ArtifactStatus>,
    ) -> Result<Vec<formsmith_storage::ArtifactRecord>, StorageError> {
        self.0.list_artifacts(status).await
    }
    async fn insert_conversation(
        &self,
        c: formsmith_storage::ConversationRecord,
    ) -> Result<(), StorageError> {
        self.0.insert_conversation(c).await
    }
    async fn get_conversation(
        &self,
        id: &str,
    ) -> Result<formsmith_storage::ConversationRecord, StorageError> {
        self.0.get_conversation(id).await
    }
    async fn update_conversation(
        &self,
        c: formsmith_storage::ConversationRecord,
    ) -> Result<(), StorageError> {
        self.0.update_conversation(c).await
    }
    async fn append_audit(&self, e: formsmith_storage::AuditEntry) -> Result<(), StorageError> {
        self.0.append_audit(e).await
    }
    async fn list_audit(
        &self,
        id: Option<&str>,
    ) -> Result<Vec<formsmith_storage::AuditEntry>, StorageError> {
        self.0.list_audit(id).await
    }
    async fn insert_submission(
        &self,
        s: formsmith_storage::SubmissionRecord,
    ) -> Result<(), StorageError> {
        self.0.insert_submission(s).await
    }
    async fn count_submissions(&self, schema: &str) -> Result<usize, StorageError> {
        self.0.count_submissions(schema).await
    }
    async fn list_submissions(
        &self,
        schema: &str,
    ) -> Result<Vec<formsmith_storage::SubmissionRecord>, StorageError> {
        self.0.list_submissions(schema).await
    }
    async fn commit(&self) -> Result<(), StorageError> {
        self.0.commit().await
    }
}

#[tokio::test]
async fn form_failure_does_not_fail_approval() {
    let engine = formsmith_engine::Engine::new(
        Arc::new(NoForms(formsmith_storage::MemoryStorage::new())),
        common::ScriptedLlm::answering(&[]),
        Arc::new(formsmith_engine::StaticConfig::default()),
    );
    let session = engine.import_draft(&admin(), feedback_spec()).await.unwrap();
    let generated = engine.generate(&session.session_id, false, &admin()).await.unwrap();

    let approval = engine.approve(&generated.artifact_id, &admin()).await.unwrap();
    assert_eq!(approval.message, "Artifact approved and schema created successfully");
    assert!(approval.form_url.is_none());
    assert_eq!(approval.schema_name.as_deref(), Some("Customer Feedback"));

    let schema = engine.storage().get_schema("Customer Feedback").await.unwrap();
    assert_eq!(schema.route.as_deref(), Some("customer-feedback"), "no hand-off without a form");
    let artifact = engine.artifact(&generated.artifact_id).await.unwrap();
    assert_eq!(artifact.status, ArtifactStatus::Approved);
}

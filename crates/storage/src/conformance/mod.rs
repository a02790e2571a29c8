//! Conformance test suite for `FormStorage` implementations.
//!
//! This module provides a backend-agnostic test suite that any `FormStorage`
//! implementation can run to verify correctness. The suite covers:
//!
//! - **Schemas**: insert/get/update, duplicate names, route lookups
//! - **Public forms**: one form per schema, route collisions, listing
//! - **Artifacts**: status filtering, updates, unknown ids
//! - **Conversations, audit, submissions**: append order and per-schema counts
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function that
//! creates a fresh, empty storage instance for each test:
//!
//! ```ignore
//! use formsmith_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn sqlite_conformance() {
//!     let report = run_conformance_suite(|| async {
//!         create_test_sqlite_storage().await
//!     }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod artifact;
mod conversation;
mod form;
mod schema;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use formsmith_core::{FieldSpec, FieldType, FormSpec};

use crate::record::{
    ArtifactRecord, ArtifactStatus, AuditAction, AuditEntry, ConversationRecord, NamingRule,
    PublicFormRecord, SchemaRecord, SubmissionRecord,
};
use crate::FormStorage;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "schema", "form", "artifact").
    pub category: String,
    /// Test name (e.g. "duplicate_schema_name_rejected").
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// storage instance, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(schema::run_schema_tests(&factory).await);
    results.extend(form::run_form_tests(&factory).await);
    results.extend(artifact::run_artifact_tests(&factory).await);
    results.extend(conversation::run_conversation_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers: record constructors with sensible defaults ──────────────────────

fn make_schema(name: &str, route: Option<&str>) -> SchemaRecord {
    SchemaRecord {
        name: name.to_string(),
        module: "Website".to_string(),
        custom: true,
        naming_rule: NamingRule::Autoincrement,
        is_submittable: false,
        track_changes: true,
        has_web_view: route.is_some(),
        allow_guest_to_view: route.is_some(),
        allow_guest_to_write: route.is_some(),
        route: route.map(str::to_string),
        description: format!("Generated from AI artifact test-{}", name),
        fields: vec![],
        permissions: vec![],
        source_artifact: None,
    }
}

fn make_form(route: &str, schema: &str) -> PublicFormRecord {
    PublicFormRecord {
        name: route.to_string(),
        title: schema.to_string(),
        backing_schema: schema.to_string(),
        module: "Website".to_string(),
        route: route.to_string(),
        login_required: false,
        allow_multiple: true,
        published: true,
        visit_link: format!("/{}", route),
        fields: vec![],
    }
}

fn make_artifact(id: &str, status: ArtifactStatus) -> ArtifactRecord {
    ArtifactRecord {
        id: id.to_string(),
        artifact_name: "Survey".to_string(),
        specification: FormSpec::new(
            "Survey",
            vec![FieldSpec::new("answer", FieldType::Data)],
        ),
        status,
        session_id: None,
        created_by: "test-user".to_string(),
        approved_by: None,
        rejection_reason: None,
        backing_schema: None,
        created_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

fn make_conversation(id: &str) -> ConversationRecord {
    ConversationRecord {
        id: id.to_string(),
        owner: "test-user".to_string(),
        template: "custom".to_string(),
        state: "active".to_string(),
        history: vec![],
        draft_specification: None,
        created_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

fn make_audit(action: AuditAction, artifact_id: &str) -> AuditEntry {
    AuditEntry {
        action,
        artifact_id: artifact_id.to_string(),
        artifact_name: "Survey".to_string(),
        actor: "test-user".to_string(),
        reason: None,
        recorded_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

fn make_submission(id: &str, schema: &str) -> SubmissionRecord {
    let mut data = BTreeMap::new();
    data.insert("answer".to_string(), "yes".to_string());
    SubmissionRecord {
        id: id.to_string(),
        form_name: schema.to_lowercase(),
        schema_name: schema.to_string(),
        submitted_by: "Anonymous".to_string(),
        submitted_at: "2025-01-01T00:00:00Z".to_string(),
        data,
        status: "New".to_string(),
        ip_address: None,
        user_agent: None,
    }
}

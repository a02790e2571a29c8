use std::future::Future;

use formsmith_core::{FieldSpec, FieldType, FormSpec};

use super::{make_audit, make_conversation, make_submission, TestResult};
use crate::record::{AuditAction, ChatMessage};
use crate::{FormStorage, StorageError};

pub(super) async fn run_conversation_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "conversation",
            "conversation_history_and_draft_round_trip",
            conversation_history_and_draft_round_trip(factory).await,
        ),
        TestResult::from_result(
            "conversation",
            "duplicate_conversation_id_rejected",
            duplicate_conversation_id_rejected(factory).await,
        ),
        TestResult::from_result(
            "audit",
            "audit_entries_keep_append_order",
            audit_entries_keep_append_order(factory).await,
        ),
        TestResult::from_result(
            "audit",
            "audit_filters_by_artifact",
            audit_filters_by_artifact(factory).await,
        ),
        TestResult::from_result(
            "submission",
            "submissions_counted_per_schema",
            submissions_counted_per_schema(factory).await,
        ),
        TestResult::from_result(
            "submission",
            "duplicate_submission_id_rejected",
            duplicate_submission_id_rejected(factory).await,
        ),
    ]
}

// ── Test implementations ──────────────────────────────────────────────────────

async fn conversation_history_and_draft_round_trip<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_conversation(make_conversation("conv-1"))
        .await
        .map_err(|e| e.to_string())?;

    let mut conv = s
        .get_conversation("conv-1")
        .await
        .map_err(|e| e.to_string())?;
    conv.history.push(ChatMessage::user("I need a survey"));
    conv.history.push(ChatMessage::assistant("Which questions?"));
    conv.draft_specification = Some(FormSpec::new(
        "Survey",
        vec![FieldSpec::new("answer", FieldType::Data)],
    ));
    s.update_conversation(conv.clone())
        .await
        .map_err(|e| e.to_string())?;

    let rec = s
        .get_conversation("conv-1")
        .await
        .map_err(|e| e.to_string())?;
    if rec != conv {
        return Err(format!("read back a different conversation: {:?}", rec));
    }
    match s.get_conversation("conv-2").await {
        Err(StorageError::NotFound { .. }) => Ok(()),
        other => Err(format!("expected NotFound, got {:?}", other)),
    }
}

async fn duplicate_conversation_id_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_conversation(make_conversation("conv-1"))
        .await
        .map_err(|e| e.to_string())?;
    match s.insert_conversation(make_conversation("conv-1")).await {
        Err(StorageError::Duplicate { .. }) => Ok(()),
        other => Err(format!("expected Duplicate, got {:?}", other)),
    }
}

async fn audit_entries_keep_append_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.append_audit(make_audit(AuditAction::Generate, "art-1"))
        .await
        .map_err(|e| e.to_string())?;
    s.append_audit(make_audit(AuditAction::Approved, "art-1"))
        .await
        .map_err(|e| e.to_string())?;
    let actions: Vec<AuditAction> = s
        .list_audit(None)
        .await
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|e| e.action)
        .collect();
    if actions != [AuditAction::Generate, AuditAction::Approved] {
        return Err(format!("unexpected audit order: {:?}", actions));
    }
    Ok(())
}

async fn audit_filters_by_artifact<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.append_audit(make_audit(AuditAction::Generate, "art-1"))
        .await
        .map_err(|e| e.to_string())?;
    s.append_audit(make_audit(AuditAction::Rejected, "art-2"))
        .await
        .map_err(|e| e.to_string())?;
    let entries = s
        .list_audit(Some("art-2"))
        .await
        .map_err(|e| e.to_string())?;
    if entries.len() != 1 || entries[0].action != AuditAction::Rejected {
        return Err(format!("unexpected entries for art-2: {:?}", entries));
    }
    Ok(())
}

async fn submissions_counted_per_schema<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for (id, schema) in [("s1", "Survey"), ("s2", "Survey"), ("s3", "Poll")] {
        s.insert_submission(make_submission(id, schema))
            .await
            .map_err(|e| e.to_string())?;
    }
    let count = s
        .count_submissions("Survey")
        .await
        .map_err(|e| e.to_string())?;
    if count != 2 {
        return Err(format!("expected 2 Survey submissions, got {}", count));
    }
    let listed = s
        .list_submissions("Poll")
        .await
        .map_err(|e| e.to_string())?;
    if listed.len() != 1 || listed[0].id != "s3" {
        return Err(format!("unexpected Poll submissions: {:?}", listed));
    }
    let none = s
        .count_submissions("Unknown")
        .await
        .map_err(|e| e.to_string())?;
    if none != 0 {
        return Err(format!("expected 0 submissions, got {}", none));
    }
    Ok(())
}

async fn duplicate_submission_id_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_submission(make_submission("s1", "Survey"))
        .await
        .map_err(|e| e.to_string())?;
    match s.insert_submission(make_submission("s1", "Survey")).await {
        Err(StorageError::Duplicate { .. }) => Ok(()),
        other => Err(format!("expected Duplicate, got {:?}", other)),
    }
}

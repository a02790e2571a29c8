use std::future::Future;

use super::{make_artifact, TestResult};
use crate::record::ArtifactStatus;
use crate::{FormStorage, StorageError};

pub(super) async fn run_artifact_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "artifact",
            "inserted_artifact_is_readable",
            inserted_artifact_is_readable(factory).await,
        ),
        TestResult::from_result(
            "artifact",
            "duplicate_artifact_id_rejected",
            duplicate_artifact_id_rejected(factory).await,
        ),
        TestResult::from_result(
            "artifact",
            "unknown_artifact_is_not_found",
            unknown_artifact_is_not_found(factory).await,
        ),
        TestResult::from_result(
            "artifact",
            "update_persists_status_change",
            update_persists_status_change(factory).await,
        ),
        TestResult::from_result(
            "artifact",
            "list_filters_by_status",
            list_filters_by_status(factory).await,
        ),
    ]
}

// ── Test implementations ──────────────────────────────────────────────────────

/// The stored specification is a frozen copy and must read back intact.
async fn inserted_artifact_is_readable<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let artifact = make_artifact("art-1", ArtifactStatus::Draft);
    s.insert_artifact(artifact.clone())
        .await
        .map_err(|e| e.to_string())?;
    let rec = s.get_artifact("art-1").await.map_err(|e| e.to_string())?;
    if rec != artifact {
        return Err(format!("read back a different artifact: {:?}", rec));
    }
    Ok(())
}

async fn duplicate_artifact_id_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_artifact(make_artifact("art-1", ArtifactStatus::Draft))
        .await
        .map_err(|e| e.to_string())?;
    match s
        .insert_artifact(make_artifact("art-1", ArtifactStatus::Approved))
        .await
    {
        Err(StorageError::Duplicate { .. }) => Ok(()),
        other => Err(format!("expected Duplicate, got {:?}", other)),
    }
}

async fn unknown_artifact_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.get_artifact("missing").await {
        Err(StorageError::NotFound { .. }) => {}
        other => return Err(format!("get: expected NotFound, got {:?}", other)),
    }
    match s
        .update_artifact(make_artifact("missing", ArtifactStatus::Approved))
        .await
    {
        Err(StorageError::NotFound { .. }) => Ok(()),
        other => Err(format!("update: expected NotFound, got {:?}", other)),
    }
}

async fn update_persists_status_change<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_artifact(make_artifact("art-1", ArtifactStatus::Draft))
        .await
        .map_err(|e| e.to_string())?;

    let mut rejected = make_artifact("art-1", ArtifactStatus::Rejected);
    rejected.rejection_reason = Some("Too vague".to_string());
    s.update_artifact(rejected)
        .await
        .map_err(|e| e.to_string())?;

    let rec = s.get_artifact("art-1").await.map_err(|e| e.to_string())?;
    if rec.status != ArtifactStatus::Rejected {
        return Err(format!("expected rejected, got {}", rec.status));
    }
    if rec.rejection_reason.as_deref() != Some("Too vague") {
        return Err(format!("reason lost: {:?}", rec.rejection_reason));
    }
    Ok(())
}

async fn list_filters_by_status<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_artifact(make_artifact("art-1", ArtifactStatus::Approved))
        .await
        .map_err(|e| e.to_string())?;
    s.insert_artifact(make_artifact("art-2", ArtifactStatus::Draft))
        .await
        .map_err(|e| e.to_string())?;
    s.insert_artifact(make_artifact("art-3", ArtifactStatus::Approved))
        .await
        .map_err(|e| e.to_string())?;

    let approved: Vec<String> = s
        .list_artifacts(Some(ArtifactStatus::Approved))
        .await
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|a| a.id)
        .collect();
    if approved != ["art-1", "art-3"] {
        return Err(format!("unexpected approved list: {:?}", approved));
    }
    let all = s.list_artifacts(None).await.map_err(|e| e.to_string())?;
    if all.len() != 3 {
        return Err(format!("expected 3 artifacts, got {}", all.len()));
    }
    Ok(())
}

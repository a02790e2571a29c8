use std::future::Future;

use super::{make_schema, TestResult};
use crate::{FormStorage, StorageError};

pub(super) async fn run_schema_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "schema",
            "inserted_schema_is_readable",
            inserted_schema_is_readable(factory).await,
        ),
        TestResult::from_result(
            "schema",
            "duplicate_schema_name_rejected",
            duplicate_schema_name_rejected(factory).await,
        ),
        TestResult::from_result(
            "schema",
            "missing_schema_is_not_found",
            missing_schema_is_not_found(factory).await,
        ),
        TestResult::from_result(
            "schema",
            "update_replaces_schema",
            update_replaces_schema(factory).await,
        ),
        TestResult::from_result(
            "schema",
            "update_of_missing_schema_is_not_found",
            update_of_missing_schema_is_not_found(factory).await,
        ),
        TestResult::from_result(
            "schema",
            "route_taken_ignores_excepted_schema",
            route_taken_ignores_excepted_schema(factory).await,
        ),
        TestResult::from_result(
            "schema",
            "count_tracks_inserts",
            count_tracks_inserts(factory).await,
        ),
    ]
}

// ── Test implementations ──────────────────────────────────────────────────────

async fn inserted_schema_is_readable<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_schema(make_schema("Survey", None))
        .await
        .map_err(|e| e.to_string())?;

    if !s.schema_exists("Survey").await.map_err(|e| e.to_string())? {
        return Err("schema_exists returned false after insert".to_string());
    }
    let rec = s.get_schema("Survey").await.map_err(|e| e.to_string())?;
    if rec != make_schema("Survey", None) {
        return Err(format!("read back a different schema: {:?}", rec));
    }
    Ok(())
}

async fn duplicate_schema_name_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_schema(make_schema("Survey", None))
        .await
        .map_err(|e| e.to_string())?;
    match s.insert_schema(make_schema("Survey", Some("survey"))).await {
        Err(StorageError::Duplicate { .. }) => {}
        other => return Err(format!("expected Duplicate, got {:?}", other)),
    }
    let rec = s.get_schema("Survey").await.map_err(|e| e.to_string())?;
    if rec.route.is_some() {
        return Err("rejected insert overwrote the stored schema".to_string());
    }
    Ok(())
}

async fn missing_schema_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    if s.schema_exists("Nope").await.map_err(|e| e.to_string())? {
        return Err("schema_exists returned true on an empty store".to_string());
    }
    match s.get_schema("Nope").await {
        Err(StorageError::NotFound { .. }) => Ok(()),
        other => Err(format!("expected NotFound, got {:?}", other)),
    }
}

async fn update_replaces_schema<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_schema(make_schema("Survey", Some("survey")))
        .await
        .map_err(|e| e.to_string())?;
    s.update_schema(make_schema("Survey", None))
        .await
        .map_err(|e| e.to_string())?;
    let rec = s.get_schema("Survey").await.map_err(|e| e.to_string())?;
    if rec.route.is_some() || rec.has_web_view {
        return Err(format!("update did not replace the schema: {:?}", rec));
    }
    Ok(())
}

async fn update_of_missing_schema_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.update_schema(make_schema("Ghost", None)).await {
        Err(StorageError::NotFound { .. }) => Ok(()),
        other => Err(format!("expected NotFound, got {:?}", other)),
    }
}

async fn route_taken_ignores_excepted_schema<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_schema(make_schema("Survey", Some("survey")))
        .await
        .map_err(|e| e.to_string())?;

    if !s
        .schema_route_taken("survey", "Other")
        .await
        .map_err(|e| e.to_string())?
    {
        return Err("route served by Survey reported free".to_string());
    }
    if s
        .schema_route_taken("survey", "Survey")
        .await
        .map_err(|e| e.to_string())?
    {
        return Err("a schema's own route reported taken".to_string());
    }
    if s
        .schema_route_taken("survey-1", "Other")
        .await
        .map_err(|e| e.to_string())?
    {
        return Err("unused route reported taken".to_string());
    }
    Ok(())
}

async fn count_tracks_inserts<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for name in ["A", "B", "C"] {
        s.insert_schema(make_schema(name, None))
            .await
            .map_err(|e| e.to_string())?;
    }
    let _ = s.insert_schema(make_schema("A", None)).await;
    let count = s.count_schemas().await.map_err(|e| e.to_string())?;
    if count != 3 {
        return Err(format!("expected 3 schemas, got {}", count));
    }
    Ok(())
}

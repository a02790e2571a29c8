use std::future::Future;

use super::{make_form, make_schema, TestResult};
use crate::{FormStorage, StorageError};

pub(super) async fn run_form_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "form",
            "form_is_found_by_backing_schema",
            form_is_found_by_backing_schema(factory).await,
        ),
        TestResult::from_result(
            "form",
            "second_form_for_schema_rejected",
            second_form_for_schema_rejected(factory).await,
        ),
        TestResult::from_result(
            "form",
            "duplicate_form_name_rejected",
            duplicate_form_name_rejected(factory).await,
        ),
        TestResult::from_result(
            "form",
            "form_route_taken_reflects_inserts",
            form_route_taken_reflects_inserts(factory).await,
        ),
        TestResult::from_result(
            "form",
            "list_returns_every_form",
            list_returns_every_form(factory).await,
        ),
    ]
}

// ── Test implementations ──────────────────────────────────────────────────────

async fn form_is_found_by_backing_schema<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_schema(make_schema("Survey", None))
        .await
        .map_err(|e| e.to_string())?;
    if s
        .public_form_for_schema("Survey")
        .await
        .map_err(|e| e.to_string())?
        .is_some()
    {
        return Err("form found before one was inserted".to_string());
    }
    s.insert_public_form(make_form("survey", "Survey"))
        .await
        .map_err(|e| e.to_string())?;
    match s
        .public_form_for_schema("Survey")
        .await
        .map_err(|e| e.to_string())?
    {
        Some(form) if form.route == "survey" => Ok(()),
        other => Err(format!("expected form 'survey', got {:?}", other)),
    }
}

/// At most one public form may exist per schema.
async fn second_form_for_schema_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_public_form(make_form("survey", "Survey"))
        .await
        .map_err(|e| e.to_string())?;
    match s.insert_public_form(make_form("survey-1", "Survey")).await {
        Err(StorageError::Duplicate { .. }) => {}
        other => return Err(format!("expected Duplicate, got {:?}", other)),
    }
    let forms = s.list_public_forms().await.map_err(|e| e.to_string())?;
    if forms.len() != 1 {
        return Err(format!("expected 1 form, got {}", forms.len()));
    }
    Ok(())
}

async fn duplicate_form_name_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_public_form(make_form("survey", "Survey"))
        .await
        .map_err(|e| e.to_string())?;
    match s.insert_public_form(make_form("survey", "Other Survey")).await {
        Err(StorageError::Duplicate { .. }) => Ok(()),
        other => Err(format!("expected Duplicate, got {:?}", other)),
    }
}

async fn form_route_taken_reflects_inserts<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    if s.form_route_taken("survey").await.map_err(|e| e.to_string())? {
        return Err("route taken on an empty store".to_string());
    }
    s.insert_public_form(make_form("survey", "Survey"))
        .await
        .map_err(|e| e.to_string())?;
    if !s.form_route_taken("survey").await.map_err(|e| e.to_string())? {
        return Err("route free after insert".to_string());
    }
    Ok(())
}

async fn list_returns_every_form<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_public_form(make_form("a", "A"))
        .await
        .map_err(|e| e.to_string())?;
    s.insert_public_form(make_form("b", "B"))
        .await
        .map_err(|e| e.to_string())?;
    let mut routes: Vec<String> = s
        .list_public_forms()
        .await
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|f| f.route)
        .collect();
    routes.sort();
    if routes != ["a", "b"] {
        return Err(format!("unexpected routes: {:?}", routes));
    }
    Ok(())
}

use std::path::Path;

use formsmith_engine::SubmissionOrigin;

use super::Context;

pub(crate) async fn cmd_forms(ctx: &Context) {
    let forms = match ctx.engine.public_forms().await {
        Ok(f) => f,
        Err(e) => ctx.fail(e),
    };
    ctx.emit(&forms, || {
        forms
            .iter()
            .map(|f| {
                format!(
                    "{}  {}  ({} submissions)",
                    f.form.visit_link, f.form.backing_schema, f.submission_count
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    });
}

/// Record a submission as if it arrived through the schema's public form.
pub(crate) async fn cmd_submit(ctx: &Context, schema_name: &str, values_path: &Path) {
    let src = std::fs::read_to_string(values_path).unwrap_or_else(|e| {
        ctx.fail(format!("error reading file '{}': {}", values_path.display(), e))
    });
    let values: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&src)
        .unwrap_or_else(|e| {
            ctx.fail(format!(
                "error parsing JSON object in '{}': {}",
                values_path.display(),
                e
            ))
        });

    let origin = SubmissionOrigin {
        via_public_form: true,
        ip_address: None,
        user_agent: Some(format!("formsmith-cli/{}", env!("CARGO_PKG_VERSION"))),
    };
    let record = ctx
        .engine
        .track_submission(schema_name, &values, Some(&ctx.actor), &origin)
        .await;
    match record {
        Some(record) => ctx.emit(&record, || {
            format!("submission {} recorded for {}", record.id, record.form_name)
        }),
        None => ctx.fail(format!("submission to '{}' was not tracked", schema_name)),
    }
}

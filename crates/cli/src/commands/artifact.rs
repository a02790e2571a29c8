use formsmith_storage::ArtifactStatus;

use super::Context;

pub(crate) async fn cmd_generate(ctx: &Context, session_id: &str, publish: bool) {
    match ctx.engine.generate(session_id, publish, &ctx.actor).await {
        Ok(response) => ctx.emit(&response, || {
            let mut lines = vec![
                response.message.clone(),
                format!("artifact: {}", response.artifact_id),
                format!("status: {}", response.status),
                format!("schema: {}", response.schema_name),
            ];
            lines.extend(response.notices.iter().map(|n| format!("note: {}", n)));
            lines.join("\n")
        }),
        Err(e) => ctx.fail(e),
    }
}

pub(crate) async fn cmd_approve(ctx: &Context, artifact_id: &str) {
    match ctx.engine.approve(artifact_id, &ctx.actor).await {
        Ok(response) => ctx.emit(&response, || {
            let mut lines = vec![response.message.clone()];
            if let Some(schema) = &response.schema_name {
                lines.push(format!("schema: {}", schema));
            }
            if let Some(url) = &response.form_url {
                lines.push(format!("form: {}", url));
            }
            lines.extend(response.notices.iter().map(|n| format!("note: {}", n)));
            lines.join("\n")
        }),
        Err(e) => ctx.fail(e),
    }
}

pub(crate) async fn cmd_reject(ctx: &Context, artifact_id: &str, reason: Option<&str>) {
    match ctx.engine.reject(artifact_id, reason, &ctx.actor).await {
        Ok(response) => ctx.emit(&response, || response.message.clone()),
        Err(e) => ctx.fail(e),
    }
}

pub(crate) async fn cmd_artifacts(ctx: &Context, status: Option<ArtifactStatus>) {
    let artifacts = match ctx.engine.artifacts(status).await {
        Ok(a) => a,
        Err(e) => ctx.fail(e),
    };
    ctx.emit(&artifacts, || {
        artifacts
            .iter()
            .map(|a| {
                let schema = a.backing_schema.as_deref().unwrap_or("-");
                format!("{}  {:<8}  {}  -> {}", a.id, a.status.to_string(), a.artifact_name, schema)
            })
            .collect::<Vec<_>>()
            .join("\n")
    });
}

pub(crate) async fn cmd_audit(ctx: &Context, artifact_id: Option<&str>) {
    let entries = match ctx.engine.audit_trail(artifact_id).await {
        Ok(e) => e,
        Err(e) => ctx.fail(e),
    };
    ctx.emit(&entries, || {
        entries
            .iter()
            .map(|e| {
                let mut line = format!(
                    "{}  {:<8}  {}  {}  by {}",
                    e.recorded_at, e.action.to_string(), e.artifact_id, e.artifact_name, e.actor
                );
                if let Some(reason) = &e.reason {
                    line.push_str(&format!(" ({})", reason));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    });
}

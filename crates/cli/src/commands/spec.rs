use std::path::Path;
use std::process;

use formsmith_core::{parse_response, validate};

use super::{load_spec, Context};
use crate::{print_json, report_error, OutputFormat};

static FORM_SPEC_SCHEMA_STR: &str = include_str!("../../../../schema/form-spec-schema.json");

/// Check a specification against the validation rules, then check its
/// canonical serialization against the formal JSON Schema.
pub(crate) fn cmd_validate(spec_path: &Path, output: OutputFormat, quiet: bool) {
    let spec = match load_spec(spec_path) {
        Ok(spec) => spec,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let issues: Vec<String> = validate(&spec).iter().map(|i| i.to_string()).collect();
    let errors = if issues.is_empty() {
        schema_errors(&spec, output, quiet)
    } else {
        Vec::new()
    };

    if issues.is_empty() && errors.is_empty() {
        if !quiet {
            match output {
                OutputFormat::Text => println!("valid"),
                OutputFormat::Json => println!("{{\"valid\": true}}"),
            }
        }
        return;
    }

    match output {
        OutputFormat::Text => {
            if !quiet {
                eprintln!("invalid specification");
                for line in issues.iter().chain(errors.iter()) {
                    eprintln!("  - {}", line);
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "valid": false,
                "issues": issues,
                "errors": errors,
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
    process::exit(1);
}

fn schema_errors(spec: &formsmith_core::FormSpec, output: OutputFormat, quiet: bool) -> Vec<String> {
    let schema: serde_json::Value = match serde_json::from_str(FORM_SPEC_SCHEMA_STR) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("internal error: failed to parse embedded schema: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    let validator = match jsonschema::validator_for(&schema) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("internal error: failed to compile schema: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    let instance = match serde_json::to_value(spec) {
        Ok(v) => v,
        Err(e) => {
            report_error(&format!("serialization error: {}", e), output, quiet);
            process::exit(1);
        }
    };
    validator
        .iter_errors(&instance)
        .map(|e| format!("{}", e))
        .collect()
}

/// Run the response parser over a saved assistant answer.
pub(crate) fn cmd_parse(response_path: &Path, output: OutputFormat, quiet: bool) {
    let text = match std::fs::read_to_string(response_path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", response_path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    let parsed = parse_response(&text);
    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => print_json(&parsed),
        OutputFormat::Text => {
            match &parsed.specification {
                Some(spec) => println!(
                    "specification: {} ({} fields)",
                    spec.name.as_deref().unwrap_or("<unnamed>"),
                    spec.field_list().len()
                ),
                None => println!("specification: none"),
            }
            println!("ready: {}", if parsed.ready { "yes" } else { "no" });
            for issue in &parsed.issues {
                println!("  - {}", issue);
            }
            if let Some(err) = &parsed.parse_error {
                println!("parse error: {}", err);
            }
        }
    }
}

/// Compile a specification file straight into a schema, optionally with its
/// public form.
pub(crate) async fn cmd_synthesize(ctx: &Context, spec_path: &Path, artifact_id: &str, form: bool) {
    let spec = load_spec(spec_path).unwrap_or_else(|msg| ctx.fail(msg));
    let synthesis = match ctx.engine.synthesize(&spec, artifact_id).await {
        Ok(s) => s,
        Err(e) => ctx.fail(e),
    };
    let derived = if form {
        match ctx.engine.derive_form(&synthesis.schema.name).await {
            Ok(d) => Some(d.form),
            Err(e) => ctx.fail(e),
        }
    } else {
        None
    };

    let json = serde_json::json!({
        "schema": synthesis.schema,
        "notices": synthesis.notices,
        "form": derived,
    });
    ctx.emit(&json, || {
        let mut lines = vec![format!("created schema '{}'", synthesis.schema.name)];
        lines.extend(synthesis.notices.iter().map(|n| format!("note: {}", n)));
        match &derived {
            Some(form) => lines.push(format!("public form at {}", form.visit_link)),
            None => {
                if let Some(route) = &synthesis.schema.route {
                    lines.push(format!("web route /{}", route));
                }
            }
        }
        lines.join("\n")
    });
}

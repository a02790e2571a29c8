//! Schema synthesizer: compiles a validated specification into a uniquely
//! named schema record.

use formsmith_core::slug::{self, NAME_SEPARATOR, ROUTE_SEPARATOR};
use formsmith_core::{validate, FieldType, FormSpec};
use formsmith_storage::{FormStorage, NamingRule, SchemaField, SchemaRecord};
use serde::Serialize;

use crate::config::AiConfig;
use crate::error::EngineError;
use crate::service::Engine;

/// Name of the hidden field carrying a schema's route.
pub const ROUTE_FIELD: &str = "route";

const FORMAT_PREFIX: &str = "format:";

/// A created schema plus the non-fatal notices raised while creating it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Synthesis {
    pub schema: SchemaRecord,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

impl<S: FormStorage> Engine<S> {
    /// Create a schema from `spec` and commit it.
    ///
    /// The requested name and route are suffixed until free. The store is
    /// still the final arbiter: a concurrent insert under the same name
    /// surfaces as [`EngineError::Conflict`].
    pub async fn synthesize(
        &self,
        spec: &FormSpec,
        artifact_id: &str,
    ) -> Result<Synthesis, EngineError> {
        let issues = validate(spec);
        if !issues.is_empty() {
            return Err(EngineError::Validation(issues));
        }
        let config = self.config.config()?;
        let requested = spec.name.as_deref().unwrap_or_default();

        let mut notices = Vec::new();
        let name = self.free_schema_name(requested).await?;
        if name != requested {
            notices.push(format!(
                "A schema named '{}' already exists. Creating as '{}' instead.",
                requested, name
            ));
        }
        let route = if spec.is_web_accessible {
            Some(self.free_schema_route(&name).await?)
        } else {
            None
        };

        let mut synthesis = build_schema(spec, &name, route, artifact_id, &config);
        notices.append(&mut synthesis.notices);
        synthesis.notices = notices;

        self.storage.insert_schema(synthesis.schema.clone()).await?;
        self.storage.commit().await?;
        tracing::info!(
            schema = %synthesis.schema.name,
            artifact = %artifact_id,
            route = ?synthesis.schema.route,
            "schema created"
        );
        Ok(synthesis)
    }

    async fn free_schema_name(&self, requested: &str) -> Result<String, EngineError> {
        for candidate in slug::candidates(requested, NAME_SEPARATOR) {
            if !self.storage.schema_exists(&candidate).await? {
                if candidate != requested {
                    tracing::debug!(requested, resolved = %candidate, "schema name suffixed");
                }
                return Ok(candidate);
            }
        }
        Err(EngineError::Conflict(format!("no free schema name for '{}'", requested)))
    }

    async fn free_schema_route(&self, name: &str) -> Result<String, EngineError> {
        let base = slug::schema_route(name);
        for candidate in slug::candidates(&base, ROUTE_SEPARATOR) {
            if !self.storage.schema_route_taken(&candidate, name).await? {
                return Ok(candidate);
            }
        }
        Err(EngineError::Conflict(format!("no free route for '{}'", base)))
    }
}

/// Map a specification's naming rule onto the host's naming rules.
pub fn naming_rule(spec: &FormSpec) -> NamingRule {
    match spec
        .naming_rule
        .as_deref()
        .and_then(|rule| rule.strip_prefix(FORMAT_PREFIX))
    {
        Some(pattern) => NamingRule::NamingSeries {
            pattern: pattern.replace("{#####}", ".#####"),
        },
        None => NamingRule::Autoincrement,
    }
}

/// Build the schema record for `spec` under an already resolved name and
/// route. Pure; nothing is persisted.
pub fn build_schema(
    spec: &FormSpec,
    name: &str,
    route: Option<String>,
    artifact_id: &str,
    config: &AiConfig,
) -> Synthesis {
    let mut notices = Vec::new();
    let web = spec.is_web_accessible;

    let mut fields: Vec<SchemaField> = spec
        .field_list()
        .iter()
        .zip(1u32..)
        .map(|(f, idx)| SchemaField {
            fieldname: f.fieldname.clone(),
            label: f.label.clone(),
            fieldtype: f.fieldtype.host_type(),
            mandatory: f.mandatory,
            hidden: false,
            read_only: false,
            in_list_view: f.in_list_view,
            in_standard_filter: f.in_standard_filter,
            options: f.options.clone(),
            default: f.default.clone(),
            description: f.description.clone(),
            depends_on: f.depends_on.clone(),
            idx,
        })
        .collect();

    if route.is_some() {
        let has_route_field = fields
            .iter()
            .any(|f| f.fieldname.as_deref() == Some(ROUTE_FIELD));
        if has_route_field {
            notices.push(format!(
                "Field '{}' already exists and will hold the web route.",
                ROUTE_FIELD
            ));
        } else {
            let idx = fields.len() as u32 + 1;
            fields.push(SchemaField {
                fieldname: Some(ROUTE_FIELD.to_string()),
                label: Some("Route".to_string()),
                fieldtype: FieldType::Data,
                mandatory: false,
                hidden: true,
                read_only: true,
                in_list_view: false,
                in_standard_filter: false,
                options: None,
                default: None,
                description: None,
                depends_on: None,
                idx,
            });
        }
    }

    let module = spec
        .module
        .clone()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| config.default_module(web).to_string());
    let description = spec
        .description
        .clone()
        .unwrap_or_else(|| format!("Generated from AI artifact {}", artifact_id));

    let schema = SchemaRecord {
        name: name.to_string(),
        module,
        custom: true,
        naming_rule: naming_rule(spec),
        is_submittable: spec.is_submittable,
        track_changes: true,
        has_web_view: web,
        allow_guest_to_view: web,
        allow_guest_to_write: web,
        route,
        description,
        fields,
        permissions: Vec::new(),
        source_artifact: Some(artifact_id.to_string()),
    };
    Synthesis { schema, notices }
}

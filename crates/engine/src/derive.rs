//! Form derivation: at most one public form per schema, mirrored from the
//! schema's own fields.

use formsmith_core::slug::{self, ROUTE_SEPARATOR};
use formsmith_storage::{FormStorage, Permission, PublicFormField, PublicFormRecord, SchemaRecord};
use serde::Serialize;

use crate::actor::GUEST;
use crate::error::EngineError;
use crate::service::Engine;

/// Module every public form is filed under.
pub const FORM_MODULE: &str = "Website";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedForm {
    pub form: PublicFormRecord,
    /// False when the schema already had a form and nothing changed.
    pub created: bool,
}

impl<S: FormStorage> Engine<S> {
    /// Create the public form for `schema_name`, or return the existing one.
    ///
    /// Creating a form hands the public path over to it: the schema's own
    /// route and web view are cleared and guests get read/write/create on the
    /// schema. Both steps are committed separately. A hand-off that did not
    /// land is re-applied the next time the existing form is returned.
    pub async fn derive_form(&self, schema_name: &str) -> Result<DerivedForm, EngineError> {
        if let Some(form) = self.storage.public_form_for_schema(schema_name).await? {
            let mut schema = self.storage.get_schema(schema_name).await?;
            if schema.has_web_view || schema.route.is_some() {
                tracing::warn!(schema = %schema_name, "re-applying form hand-off");
                hand_off(&mut schema);
                self.storage.update_schema(schema).await?;
                self.storage.commit().await?;
            }
            return Ok(DerivedForm {
                form,
                created: false,
            });
        }
        let mut schema = self.storage.get_schema(schema_name).await?;

        let base = slug::form_route(&schema.name);
        let mut route = None;
        for candidate in slug::candidates(&base, ROUTE_SEPARATOR) {
            if !self.storage.form_route_taken(&candidate).await? {
                route = Some(candidate);
                break;
            }
        }
        let route =
            route.ok_or_else(|| EngineError::Conflict(format!("no free form route for '{}'", base)))?;

        let form = build_form(&schema, &route);
        self.storage.insert_public_form(form.clone()).await?;
        self.storage.commit().await?;

        hand_off(&mut schema);
        self.storage.update_schema(schema).await?;
        self.storage.commit().await?;

        tracing::info!(schema = %schema_name, route = %route, "public form created");
        Ok(DerivedForm {
            form,
            created: true,
        })
    }
}

/// The public form for `schema` at `route`. Layout-only and hidden fields are
/// left out; the rest keep their order and index.
pub fn build_form(schema: &SchemaRecord, route: &str) -> PublicFormRecord {
    let fields = schema
        .fields
        .iter()
        .filter(|f| !f.fieldtype.is_layout_only() && !f.hidden)
        .filter_map(|f| {
            Some(PublicFormField {
                fieldname: f.fieldname.clone()?,
                label: f.label.clone(),
                fieldtype: f.fieldtype.clone(),
                mandatory: f.mandatory,
                options: f.options.clone(),
                description: f.description.clone(),
                idx: f.idx,
            })
        })
        .collect();

    PublicFormRecord {
        name: route.to_string(),
        title: schema.name.clone(),
        backing_schema: schema.name.clone(),
        module: FORM_MODULE.to_string(),
        route: route.to_string(),
        login_required: false,
        allow_multiple: true,
        published: true,
        visit_link: format!("/{}", route),
        fields,
    }
}

/// Release the schema's public path to its form and let guests submit.
/// Applying it twice leaves a single Guest permission.
pub fn hand_off(schema: &mut SchemaRecord) {
    schema.route = None;
    schema.has_web_view = false;
    schema.allow_guest_to_view = false;
    if schema.permissions.iter().any(|p| p.role == GUEST) {
        return;
    }
    schema.permissions.push(Permission {
        role: GUEST.to_string(),
        read: true,
        write: true,
        create: true,
        submit: false,
        cancel: false,
        amend: false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use crate::synthesize::build_schema;
    use formsmith_core::{FieldSpec, FieldType, FormSpec};

    fn schema() -> SchemaRecord {
        let spec = FormSpec::new(
            "Site_Visit Log",
            vec![
                FieldSpec::new("visitor", FieldType::Data).required(),
                FieldSpec::layout(FieldType::SectionBreak),
                FieldSpec {
                    description: Some("Anything else?".into()),
                    ..FieldSpec::new("notes", FieldType::TextArea)
                },
                FieldSpec::layout(FieldType::Html),
                FieldSpec::new("rating", FieldType::Rating).with_options("5"),
            ],
        );
        build_schema(&spec, "Site_Visit Log", Some("site_visit-log".into()), "a", &AiConfig::default())
            .schema
    }

    #[test]
    fn form_mirrors_visible_content_fields() {
        let form = build_form(&schema(), "site-visit-log");
        let names: Vec<&str> = form.fields.iter().map(|f| f.fieldname.as_str()).collect();
        assert_eq!(names, vec!["visitor", "notes", "rating"]);
        assert_eq!(form.fields[1].idx, 3);
        assert_eq!(form.fields[1].fieldtype, FieldType::SmallText);
        assert!(form.fields[0].mandatory);
        assert_eq!(form.fields[1].description.as_deref(), Some("Anything else?"));
        assert_eq!(form.fields[2].options.as_deref(), Some("5"));
        assert_eq!(form.fields[2].idx, 5);
        assert_eq!(form.visit_link, "/site-visit-log");
        assert_eq!(form.title, "Site_Visit Log");
        assert!(!form.login_required && form.allow_multiple && form.published);
    }

    #[test]
    fn hand_off_clears_web_view_and_grants_guest() {
        let mut s = schema();
        hand_off(&mut s);
        assert!(s.route.is_none());
        assert!(!s.has_web_view && !s.allow_guest_to_view);
        assert_eq!(s.permissions.len(), 1);
        let p = &s.permissions[0];
        assert_eq!(p.role, "Guest");
        assert!(p.read && p.write && p.create);
        assert!(!p.submit && !p.cancel && !p.amend);
    }

    #[test]
    fn hand_off_twice_keeps_one_guest_permission() {
        let mut s = schema();
        hand_off(&mut s);
        s.route = Some("site_visit-log".into());
        s.has_web_view = true;
        hand_off(&mut s);
        assert!(s.route.is_none() && !s.has_web_view);
        assert_eq!(s.permissions.len(), 1);
    }
}

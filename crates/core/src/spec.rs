//! Canonical form specification shape.
//!
//! Specifications arrive from LLM output, so decoding is lenient: flags may be
//! written as `true`, `1` or `"1"`, empty strings count as absent, and a
//! `fields` value that is not a list decodes as missing so the validator can
//! report it instead of the whole document failing to decode.

use serde::{Deserialize, Serialize};

use crate::fieldtype::FieldType;

/// One field of a form specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub fieldname: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub label: Option<String>,
    #[serde(default = "missing_fieldtype", deserialize_with = "lenient::fieldtype")]
    pub fieldtype: FieldType,
    #[serde(default, alias = "reqd", deserialize_with = "lenient::flag")]
    pub mandatory: bool,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub options: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub depends_on: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::flag",
        skip_serializing_if = "is_false"
    )]
    pub in_list_view: bool,
    #[serde(
        default,
        deserialize_with = "lenient::flag",
        skip_serializing_if = "is_false"
    )]
    pub in_standard_filter: bool,
}

fn missing_fieldtype() -> FieldType {
    FieldType::Unrecognized(String::new())
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn default_true() -> bool {
    true
}

impl FieldSpec {
    pub fn new(fieldname: &str, fieldtype: FieldType) -> Self {
        FieldSpec {
            fieldname: Some(fieldname.to_string()),
            label: None,
            fieldtype,
            mandatory: false,
            options: None,
            default: None,
            description: None,
            depends_on: None,
            in_list_view: false,
            in_standard_filter: false,
        }
    }

    /// A layout-only field (section or column break, static HTML, button).
    pub fn layout(fieldtype: FieldType) -> Self {
        FieldSpec {
            fieldname: None,
            ..FieldSpec::new("", fieldtype)
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_options(mut self, options: &str) -> Self {
        self.options = Some(options.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.mandatory = true;
        self
    }
}

/// A complete form specification in canonical shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFormSpec")]
pub struct FormSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub naming_rule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_single: bool,
    pub is_submittable: bool,
    pub is_web_accessible: bool,
    pub allow_guest_to_save: bool,
    /// `None` when the input had no field list, or something other than a list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldSpec>>,
}

impl FormSpec {
    pub fn new(name: &str, fields: Vec<FieldSpec>) -> Self {
        FormSpec {
            name: Some(name.to_string()),
            module: None,
            naming_rule: None,
            title_field: None,
            description: None,
            is_single: false,
            is_submittable: false,
            is_web_accessible: true,
            allow_guest_to_save: false,
            fields: Some(fields),
        }
    }

    /// Decode a specification from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn from_json(src: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(src)
    }

    /// The fields, or an empty slice when the list was missing.
    pub fn field_list(&self) -> &[FieldSpec] {
        self.fields.as_deref().unwrap_or(&[])
    }
}

/// Wire shape accepted on input: either `doctype_name` or `name`, and either
/// `naming_rule` or `autoname`.
#[derive(Deserialize)]
struct RawFormSpec {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    doctype_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    module: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    naming_rule: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    autoname: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    title_field: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    is_single: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    is_submittable: bool,
    #[serde(default = "default_true", deserialize_with = "lenient::flag_or_true")]
    is_web_accessible: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    allow_guest_to_save: bool,
    #[serde(default, deserialize_with = "lenient::field_list")]
    fields: Option<Vec<FieldSpec>>,
}

impl From<RawFormSpec> for FormSpec {
    fn from(raw: RawFormSpec) -> Self {
        FormSpec {
            name: raw.doctype_name.or(raw.name),
            module: raw.module,
            naming_rule: raw.naming_rule.or(raw.autoname),
            title_field: raw.title_field,
            description: raw.description,
            is_single: raw.is_single,
            is_submittable: raw.is_submittable,
            is_web_accessible: raw.is_web_accessible,
            allow_guest_to_save: raw.allow_guest_to_save,
            fields: raw.fields,
        }
    }
}

mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{FieldSpec, FieldType};

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            // Select options are sometimes suggested as a list; the host
            // expects them newline-separated.
            Value::Array(items) => {
                let parts: Vec<String> = items
                    .into_iter()
                    .map(|v| match v {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect();
                if parts.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(parts.join("\n")))
                }
            }
            Value::Object(_) => Err(D::Error::custom("expected text, found an object")),
        }
    }

    fn value_to_flag<E: Error>(v: Value) -> Result<Option<bool>, E> {
        match v {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(b)),
            Value::Number(n) => Ok(Some(n.as_f64().is_some_and(|f| f != 0.0))),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => Ok(Some(true)),
                "0" | "false" | "no" | "" => Ok(Some(false)),
                other => Err(E::custom(format!("expected a flag, found \"{}\"", other))),
            },
            other => Err(E::custom(format!("expected a flag, found {}", other))),
        }
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(value_to_flag::<D::Error>(Value::deserialize(d)?)?.unwrap_or(false))
    }

    pub fn flag_or_true<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(value_to_flag::<D::Error>(Value::deserialize(d)?)?.unwrap_or(true))
    }

    /// A null or non-text fieldtype decodes as unrecognized so the
    /// validator reports it against the field.
    pub fn fieldtype<'de, D: Deserializer<'de>>(d: D) -> Result<FieldType, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => FieldType::from(s),
            Value::Null => FieldType::Unrecognized(String::new()),
            other => FieldType::Unrecognized(other.to_string()),
        })
    }

    pub fn field_list<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Vec<FieldSpec>>, D::Error> {
        match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| FieldSpec::deserialize(item).map_err(D::Error::custom))
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            _ => Ok(None),
        }
    }
}

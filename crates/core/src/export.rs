//! Normalization of full schema exports into the simplified specification shape.
//!
//! LLMs sometimes answer with a complete host schema export instead of the
//! simplified shape they were asked for. Exports are recognized by the
//! top-level `"doctype": "DocType"` marker and use 0/1 integers for flags.

use serde_json::{json, Map, Value};

/// Discriminant value marking a full schema export.
pub const EXPORT_MARKER: &str = "DocType";

/// Field attributes kept even when empty or falsy.
const ALWAYS_KEPT: &[&str] = &["fieldname", "label", "fieldtype", "mandatory"];

pub fn is_schema_export(value: &Value) -> bool {
    value.get("doctype").and_then(Value::as_str) == Some(EXPORT_MARKER)
}

/// Translate an export into the simplified shape. Non-export values are
/// returned unchanged.
pub fn normalize(value: Value) -> Value {
    if !is_schema_export(&value) {
        return value;
    }

    let fields: Vec<Value> = value
        .get("fields")
        .and_then(Value::as_array)
        .map(|fields| fields.iter().map(normalize_field).collect())
        .unwrap_or_default();

    json!({
        "name": value.get("name").cloned().unwrap_or(Value::Null),
        "module": text_or(&value, "module", "Custom"),
        "is_single": flag_is_set(&value, "issingle", 0),
        "is_submittable": flag_is_set(&value, "is_submittable", 0),
        "naming_rule": text_or(&value, "autoname", "autoincrement"),
        "title_field": value.get("title_field").cloned().unwrap_or(Value::Null),
        "is_web_accessible": flag_is_set(&value, "is_web_accessible", 1),
        "allow_guest_to_save": flag_is_set(&value, "allow_guests", 0),
        "fields": fields,
    })
}

fn normalize_field(field: &Value) -> Value {
    let candidates = [
        ("fieldname", field.get("fieldname").cloned().unwrap_or(Value::Null)),
        ("label", field.get("label").cloned().unwrap_or(Value::Null)),
        ("fieldtype", field.get("fieldtype").cloned().unwrap_or(Value::Null)),
        ("mandatory", Value::Bool(flag_is_set(field, "reqd", 0))),
        ("options", field.get("options").cloned().unwrap_or(Value::Null)),
        ("description", field.get("description").cloned().unwrap_or(Value::Null)),
        ("default", field.get("default").cloned().unwrap_or(Value::Null)),
        ("depends_on", field.get("depends_on").cloned().unwrap_or(Value::Null)),
    ];

    let mut out = Map::new();
    for (key, v) in candidates {
        if ALWAYS_KEPT.contains(&key) || is_truthy(&v) {
            out.insert(key.to_string(), v);
        }
    }
    Value::Object(out)
}

/// Export flags are set only when equal to 1 (`true` is accepted as well).
fn flag_is_set(obj: &Value, key: &str, default: i64) -> bool {
    match obj.get(key) {
        None => default == 1,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(_) => false,
    }
}

fn text_or(obj: &Value, key: &str, default: &str) -> Value {
    obj.get(key)
        .cloned()
        .unwrap_or_else(|| Value::String(default.to_string()))
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

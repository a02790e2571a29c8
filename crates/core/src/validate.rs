//! Specification validation.
//!
//! All violations are collected rather than stopping at the first one. Issues
//! come out in field-list order, and within a field in rule order.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fieldtype::FieldType;
use crate::spec::{FieldSpec, FormSpec};

/// System column names a fieldname may not shadow.
pub const RESERVED_FIELDNAMES: &[&str] = &["owner", "creation", "modified", "modified_by", "docstatus"];

/// Longest fieldname the host accepts.
pub const MAX_FIELDNAME_LEN: usize = 140;

/// Which rule an issue violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    MissingName,
    MissingFields,
    UnknownFieldType,
    MissingFieldname,
    ReservedFieldname,
    FieldnameFormat,
    FieldnameTooLong,
    MissingLinkTarget,
    DuplicateFieldname,
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// The offending fieldname, when the issue is about a named field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub rule: ValidationRule,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: Option<&str>, rule: ValidationRule, message: String) -> Self {
        ValidationIssue {
            field: field.map(str::to_owned),
            rule,
            message,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validate a specification. An empty result means the specification is valid.
pub fn validate(spec: &FormSpec) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if spec.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
        issues.push(ValidationIssue::new(
            None,
            ValidationRule::MissingName,
            "Form name is required".to_string(),
        ));
    }

    let fields = match spec.fields.as_deref() {
        Some(fields) if !fields.is_empty() => fields,
        _ => {
            issues.push(ValidationIssue::new(
                None,
                ValidationRule::MissingFields,
                "Fields array is required".to_string(),
            ));
            return issues;
        }
    };

    let mut seen: HashSet<&str> = HashSet::new();
    for field in fields {
        validate_field(field, &mut seen, &mut issues);
    }

    issues
}

fn validate_field<'a>(
    field: &'a FieldSpec,
    seen: &mut HashSet<&'a str>,
    issues: &mut Vec<ValidationIssue>,
) {
    let fieldtype = &field.fieldtype;
    if !fieldtype.is_recognized() {
        issues.push(ValidationIssue::new(
            field.fieldname.as_deref(),
            ValidationRule::UnknownFieldType,
            format!("Field has invalid fieldtype: {}", fieldtype),
        ));
        return;
    }

    if fieldtype.is_layout_only() {
        return;
    }

    let name = match field.fieldname.as_deref() {
        Some(n) if !n.is_empty() => n,
        _ => {
            issues.push(ValidationIssue::new(
                None,
                ValidationRule::MissingFieldname,
                format!("Field with type '{}' is missing fieldname", fieldtype),
            ));
            return;
        }
    };

    if RESERVED_FIELDNAMES.contains(&name) {
        issues.push(ValidationIssue::new(
            Some(name),
            ValidationRule::ReservedFieldname,
            format!("Field '{}' uses a reserved name", name),
        ));
    }

    if !is_snake_identifier(name) {
        issues.push(ValidationIssue::new(
            Some(name),
            ValidationRule::FieldnameFormat,
            format!("Field '{}' must be lowercase with underscores only", name),
        ));
    }

    if name.chars().count() > MAX_FIELDNAME_LEN {
        issues.push(ValidationIssue::new(
            Some(name),
            ValidationRule::FieldnameTooLong,
            format!(
                "Field '{}' exceeds {} character limit",
                name, MAX_FIELDNAME_LEN
            ),
        ));
    }

    if *fieldtype == FieldType::Link && field.options.as_deref().map_or(true, str::is_empty) {
        issues.push(ValidationIssue::new(
            Some(name),
            ValidationRule::MissingLinkTarget,
            format!(
                "Link field '{}' must specify options (target DocType)",
                name
            ),
        ));
    }

    if !seen.insert(name) {
        issues.push(ValidationIssue::new(
            Some(name),
            ValidationRule::DuplicateFieldname,
            format!("Field '{}' is declared more than once", name),
        ));
    }
}

/// `[a-z][a-z0-9_]*`
fn is_snake_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer_feedback() -> FormSpec {
        FormSpec::new(
            "Customer Feedback",
            vec![
                FieldSpec::new("customer_name", FieldType::Data).required(),
                FieldSpec::new("rating", FieldType::Rating).with_options("5"),
            ],
        )
    }

    fn rules(issues: &[ValidationIssue]) -> Vec<ValidationRule> {
        issues.iter().map(|i| i.rule).collect()
    }

    #[test]
    fn customer_feedback_is_valid() {
        assert!(validate(&customer_feedback()).is_empty());
    }

    #[test]
    fn mixed_case_fieldname_yields_exactly_one_format_error() {
        let spec = FormSpec::new(
            "Customer Feedback",
            vec![FieldSpec::new("Customer Name", FieldType::Data)],
        );
        let issues = validate(&spec);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, ValidationRule::FieldnameFormat);
        assert!(issues[0].message.contains("lowercase with underscores"));
    }

    #[test]
    fn missing_name_and_fields_are_both_reported() {
        let spec = FormSpec {
            name: None,
            fields: None,
            ..customer_feedback()
        };
        assert_eq!(
            rules(&validate(&spec)),
            vec![ValidationRule::MissingName, ValidationRule::MissingFields]
        );
    }

    #[test]
    fn blank_name_is_missing() {
        for blank in ["", "   "] {
            let spec = FormSpec {
                name: Some(blank.to_string()),
                ..customer_feedback()
            };
            assert_eq!(rules(&validate(&spec)), vec![ValidationRule::MissingName]);
        }
    }

    #[test]
    fn empty_field_list_is_missing_fields() {
        let spec = FormSpec::new("X", vec![]);
        assert_eq!(rules(&validate(&spec)), vec![ValidationRule::MissingFields]);
    }

    #[test]
    fn unknown_type_skips_remaining_checks_for_that_field() {
        let spec = FormSpec::new("X", vec![FieldSpec::new("Owner Name", FieldType::parse("Emoji"))]);
        let issues = validate(&spec);
        assert_eq!(rules(&issues), vec![ValidationRule::UnknownFieldType]);
        assert_eq!(issues[0].message, "Field has invalid fieldtype: Emoji");
    }

    #[test]
    fn layout_fields_need_no_fieldname() {
        let spec = FormSpec::new(
            "X",
            vec![
                FieldSpec::layout(FieldType::SectionBreak),
                FieldSpec::new("a", FieldType::Data),
                FieldSpec::layout(FieldType::ColumnBreak),
                FieldSpec::layout(FieldType::Html),
                FieldSpec::layout(FieldType::Button),
            ],
        );
        assert!(validate(&spec).is_empty());
    }

    #[test]
    fn data_field_without_fieldname_is_reported() {
        let spec = FormSpec::new("X", vec![FieldSpec::layout(FieldType::Data)]);
        let issues = validate(&spec);
        assert_eq!(rules(&issues), vec![ValidationRule::MissingFieldname]);
        assert_eq!(issues[0].message, "Field with type 'Data' is missing fieldname");
    }

    #[test]
    fn reserved_names_are_rejected_but_name_is_allowed() {
        let spec = FormSpec::new(
            "X",
            vec![
                FieldSpec::new("owner", FieldType::Data),
                FieldSpec::new("name", FieldType::Data),
            ],
        );
        let issues = validate(&spec);
        assert_eq!(rules(&issues), vec![ValidationRule::ReservedFieldname]);
        assert_eq!(issues[0].field.as_deref(), Some("owner"));
    }

    #[test]
    fn fieldname_length_limit() {
        let ok = "a".repeat(MAX_FIELDNAME_LEN);
        let too_long = "a".repeat(MAX_FIELDNAME_LEN + 1);
        let spec = FormSpec::new(
            "X",
            vec![
                FieldSpec::new(&ok, FieldType::Data),
                FieldSpec::new(&too_long, FieldType::Data),
            ],
        );
        assert_eq!(rules(&validate(&spec)), vec![ValidationRule::FieldnameTooLong]);
    }

    #[test]
    fn link_without_target_mentions_the_field() {
        let spec = FormSpec::new(
            "X",
            vec![
                FieldSpec::new("customer", FieldType::Link),
                FieldSpec::new("supplier", FieldType::Link).with_options("Supplier"),
            ],
        );
        let issues = validate(&spec);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, ValidationRule::MissingLinkTarget);
        assert!(issues[0].message.contains("customer"));
    }

    #[test]
    fn leading_digit_or_underscore_is_rejected() {
        let spec = FormSpec::new(
            "X",
            vec![
                FieldSpec::new("1st_choice", FieldType::Data),
                FieldSpec::new("_hidden", FieldType::Data),
                FieldSpec::new("email-address", FieldType::Data),
            ],
        );
        assert_eq!(
            rules(&validate(&spec)),
            vec![
                ValidationRule::FieldnameFormat,
                ValidationRule::FieldnameFormat,
                ValidationRule::FieldnameFormat
            ]
        );
    }

    #[test]
    fn duplicates_are_reported_on_later_occurrences() {
        let spec = FormSpec::new(
            "X",
            vec![
                FieldSpec::new("email", FieldType::Data),
                FieldSpec::new("email", FieldType::Email),
            ],
        );
        let issues = validate(&spec);
        assert_eq!(rules(&issues), vec![ValidationRule::DuplicateFieldname]);
    }

    #[test]
    fn issues_follow_field_order_then_rule_order() {
        let spec = FormSpec::new(
            "X",
            vec![
                FieldSpec::new("Modified By", FieldType::Link),
                FieldSpec::new("docstatus", FieldType::Data),
            ],
        );
        assert_eq!(
            rules(&validate(&spec)),
            vec![
                ValidationRule::FieldnameFormat,
                ValidationRule::MissingLinkTarget,
                ValidationRule::ReservedFieldname,
            ]
        );
    }
}

//! Response parser: turns raw assistant text into a message, an optional
//! draft specification and a readiness signal.

use serde::{Deserialize, Serialize};

use crate::export;
use crate::spec::FormSpec;
use crate::validate::{validate, ValidationIssue};

/// Opening fence of the embedded specification block.
pub const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Phrases signalling the assistant considers the form ready. Matched
/// case-insensitively against the whole answer.
pub const READY_SIGNALS: &[&str] = &[
    "click the \"create form\" button",
    "click the create form button",
    "ready to generate",
    "form specification has been generated",
    "you can now create the form",
];

/// Result of parsing one assistant answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedResponse {
    /// The answer text, with a validation summary appended when the embedded
    /// specification has issues.
    pub message: String,
    pub specification: Option<FormSpec>,
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ValidationIssue>,
    /// Why an embedded block could not be read, if it could not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

/// Contents of the first fenced ```` ```json ```` block, trimmed. An
/// unterminated block runs to the end of the text.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find(JSON_FENCE)? + JSON_FENCE.len();
    let rest = &text[start..];
    let body = match rest.find(FENCE) {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(body.trim())
}

pub fn has_ready_signal(text: &str) -> bool {
    let lower = text.to_lowercase();
    READY_SIGNALS.iter().any(|s| lower.contains(s))
}

/// Parse an assistant answer. Never fails: unreadable JSON degrades to plain
/// conversational text with `parse_error` set.
pub fn parse_response(raw_text: &str) -> ParsedResponse {
    let mut result = ParsedResponse {
        message: raw_text.to_string(),
        specification: None,
        ready: false,
        issues: Vec::new(),
        parse_error: None,
    };

    if let Some(block) = extract_json_block(raw_text) {
        match read_specification(block) {
            Ok(spec) => {
                let issues = validate(&spec);
                if issues.is_empty() {
                    result.ready = true;
                } else {
                    result.message.push_str("\n\nValidation issues found:\n");
                    let lines: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
                    result.message.push_str(&lines.join("\n"));
                }
                result.issues = issues;
                result.specification = Some(spec);
            }
            Err(e) => {
                result.parse_error = Some(e);
            }
        }
    }

    if has_ready_signal(raw_text) {
        result.ready = true;
    }

    result
}

fn read_specification(block: &str) -> Result<FormSpec, String> {
    let value: serde_json::Value =
        serde_json::from_str(block).map_err(|e| format!("invalid JSON: {}", e))?;
    if !value.is_object() {
        return Err("specification must be a JSON object".to_string());
    }
    FormSpec::from_value(export::normalize(value))
        .map_err(|e| format!("unreadable specification: {}", e))
}

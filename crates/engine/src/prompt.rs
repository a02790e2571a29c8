//! Prompt text sent to the LLM provider.

use crate::config::AiConfig;

/// Built-in system prompt, used when the configuration sets none.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You help users design data-entry forms. Each form becomes a record type with typed fields.

How to run the conversation:
1. Start by asking what the form is for, which fields it needs, which are mandatory and what type each field has.
2. Summarize what you will create and ask the user to confirm.
3. Only once the user confirms, include the JSON specification.

Never write HTML, CSS, templates or step-by-step setup instructions. Reply with conversational text and, when ready, exactly one JSON specification.

Field types: Data (short text), Email, Small Text (multi-line), Text (long text), Rating (options = number of stars, e.g. "5"), Select (options = one choice per line), Link (options = target record type), Date, Datetime, Check, Int, Float, Currency, Attach, Section Break, Column Break.

Specification format:
```json
{
  "doctype_name": "Customer Feedback",
  "module": "Website",
  "naming_rule": "autoincrement",
  "title_field": "customer_name",
  "is_web_accessible": true,
  "fields": [
    {"fieldname": "customer_name", "label": "Customer Name", "fieldtype": "Data", "mandatory": true},
    {"fieldname": "rating", "label": "Rating", "fieldtype": "Rating", "options": "5"}
  ]
}
```

Rules:
- fieldnames are lowercase letters, digits and underscores, starting with a letter, at most 140 characters
- never use owner, creation, modified, modified_by or docstatus as a fieldname
- set "is_web_accessible": false only for internal forms; public forms are the default
- when the specification is complete, tell the user to click the "Create Form" button"#;

/// The configured system prompt, or the built-in one.
pub fn system_prompt(config: &AiConfig) -> &str {
    config
        .system_prompt
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(DEFAULT_SYSTEM_PROMPT)
}

/// The replacement message sent when an answer looks like a tutorial.
pub fn strict_retry_message(user_message: &str) -> String {
    format!(
        "Do not write a tutorial or instructions. Answer with ONE JSON specification in exactly this format:\n\n\
         ```json\n{{\n  \"doctype_name\": \"Form Name\",\n  \"fields\": [...]\n}}\n```\n\n\
         User request: {}",
        user_message
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_custom_prompt_falls_back_to_default() {
        let mut cfg = AiConfig::default();
        assert_eq!(system_prompt(&cfg), DEFAULT_SYSTEM_PROMPT);
        cfg.system_prompt = Some("  ".into());
        assert_eq!(system_prompt(&cfg), DEFAULT_SYSTEM_PROMPT);
        cfg.system_prompt = Some("Only ask about surveys.".into());
        assert_eq!(system_prompt(&cfg), "Only ask about surveys.");
    }

    #[test]
    fn retry_message_embeds_request_and_format() {
        let msg = strict_retry_message("a contact form");
        assert!(msg.ends_with("User request: a contact form"));
        assert!(msg.contains("```json"));
    }

    #[test]
    fn default_prompt_example_parses_as_ready() {
        let parsed = formsmith_core::parse_response(DEFAULT_SYSTEM_PROMPT);
        assert!(parsed.issues.is_empty(), "{:?}", parsed.issues);
        assert!(parsed.specification.is_some());
    }
}

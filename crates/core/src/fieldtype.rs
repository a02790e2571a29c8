//! The closed set of field types a specification may use.
//!
//! LLM output is free text, so any spelling outside the recognized set is
//! kept verbatim as [`FieldType::Unrecognized`] and rejected by the validator
//! rather than failing deserialization of the whole specification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A field type as written in a specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Data,
    Text,
    LongText,
    SmallText,
    TextArea,
    Textarea,
    Select,
    Link,
    Date,
    Datetime,
    Time,
    Check,
    Int,
    Float,
    Currency,
    Attach,
    AttachImage,
    Table,
    SectionBreak,
    ColumnBreak,
    Html,
    Button,
    Code,
    TextEditor,
    MarkdownEditor,
    HtmlEditor,
    ReadOnly,
    Password,
    Phone,
    Email,
    Autocomplete,
    Barcode,
    Color,
    Duration,
    Rating,
    Geolocation,
    DynamicLink,
    TableMultiSelect,
    Signature,
    Icon,
    /// A spelling outside the recognized set, kept as written.
    Unrecognized(String),
}

/// Every recognized field type, in declaration order.
pub const RECOGNIZED: &[FieldType] = &[
    FieldType::Data,
    FieldType::Text,
    FieldType::LongText,
    FieldType::SmallText,
    FieldType::TextArea,
    FieldType::Textarea,
    FieldType::Select,
    FieldType::Link,
    FieldType::Date,
    FieldType::Datetime,
    FieldType::Time,
    FieldType::Check,
    FieldType::Int,
    FieldType::Float,
    FieldType::Currency,
    FieldType::Attach,
    FieldType::AttachImage,
    FieldType::Table,
    FieldType::SectionBreak,
    FieldType::ColumnBreak,
    FieldType::Html,
    FieldType::Button,
    FieldType::Code,
    FieldType::TextEditor,
    FieldType::MarkdownEditor,
    FieldType::HtmlEditor,
    FieldType::ReadOnly,
    FieldType::Password,
    FieldType::Phone,
    FieldType::Email,
    FieldType::Autocomplete,
    FieldType::Barcode,
    FieldType::Color,
    FieldType::Duration,
    FieldType::Rating,
    FieldType::Geolocation,
    FieldType::DynamicLink,
    FieldType::TableMultiSelect,
    FieldType::Signature,
    FieldType::Icon,
];

impl FieldType {
    /// The spelling used in specifications and schema definitions.
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Data => "Data",
            FieldType::Text => "Text",
            FieldType::LongText => "Long Text",
            FieldType::SmallText => "Small Text",
            FieldType::TextArea => "Text Area",
            FieldType::Textarea => "Textarea",
            FieldType::Select => "Select",
            FieldType::Link => "Link",
            FieldType::Date => "Date",
            FieldType::Datetime => "Datetime",
            FieldType::Time => "Time",
            FieldType::Check => "Check",
            FieldType::Int => "Int",
            FieldType::Float => "Float",
            FieldType::Currency => "Currency",
            FieldType::Attach => "Attach",
            FieldType::AttachImage => "Attach Image",
            FieldType::Table => "Table",
            FieldType::SectionBreak => "Section Break",
            FieldType::ColumnBreak => "Column Break",
            FieldType::Html => "HTML",
            FieldType::Button => "Button",
            FieldType::Code => "Code",
            FieldType::TextEditor => "Text Editor",
            FieldType::MarkdownEditor => "Markdown Editor",
            FieldType::HtmlEditor => "HTML Editor",
            FieldType::ReadOnly => "Read Only",
            FieldType::Password => "Password",
            FieldType::Phone => "Phone",
            FieldType::Email => "Email",
            FieldType::Autocomplete => "Autocomplete",
            FieldType::Barcode => "Barcode",
            FieldType::Color => "Color",
            FieldType::Duration => "Duration",
            FieldType::Rating => "Rating",
            FieldType::Geolocation => "Geolocation",
            FieldType::DynamicLink => "Dynamic Link",
            FieldType::TableMultiSelect => "Table MultiSelect",
            FieldType::Signature => "Signature",
            FieldType::Icon => "Icon",
            FieldType::Unrecognized(s) => s,
        }
    }

    /// Parse an exact, case-sensitive spelling.
    pub fn parse(s: &str) -> FieldType {
        RECOGNIZED
            .iter()
            .find(|ft| ft.as_str() == s)
            .cloned()
            .unwrap_or_else(|| FieldType::Unrecognized(s.to_string()))
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, FieldType::Unrecognized(_))
    }

    /// Layout-only types carry no data and need no fieldname.
    pub fn is_layout_only(&self) -> bool {
        matches!(
            self,
            FieldType::SectionBreak | FieldType::ColumnBreak | FieldType::Html | FieldType::Button
        )
    }

    /// The type a schema actually stores for this suggestion.
    ///
    /// Some spellings an LLM likes to suggest have no host equivalent and are
    /// substituted with the nearest supported type.
    pub fn host_type(&self) -> FieldType {
        match self {
            FieldType::Email => FieldType::Data,
            FieldType::TextArea | FieldType::Textarea => FieldType::SmallText,
            other => other.clone(),
        }
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        FieldType::parse(&s)
    }
}

impl From<FieldType> for String {
    fn from(ft: FieldType) -> Self {
        match ft {
            FieldType::Unrecognized(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

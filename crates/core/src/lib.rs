//! formsmith-core: the specification half of the form compiler.
//!
//! Turns loosely structured LLM output into a canonical, validated form
//! specification. Everything here is pure: no I/O, no persistence, no
//! network access.
//!
//! # Public API
//!
//! - [`parse_response()`] -- extract and normalize an embedded specification
//! - [`validate()`] -- check a specification against naming and type rules
//! - [`FormSpec`], [`FieldSpec`], [`FieldType`] -- the canonical shape
//! - [`ResponseFilter`] -- pluggable tutorial detection
//! - [`slug`] -- route slugs and collision suffix candidates

pub mod export;
pub mod fieldtype;
pub mod heuristic;
pub mod parse;
pub mod slug;
pub mod spec;
pub mod validate;

// ── Convenience re-exports ───────────────────────────────────────────

pub use fieldtype::FieldType;
pub use heuristic::{KeywordTutorialFilter, NoFilter, ResponseFilter};
pub use parse::{parse_response, ParsedResponse};
pub use spec::{FieldSpec, FormSpec};
pub use validate::{validate, ValidationIssue, ValidationRule};

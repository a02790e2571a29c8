//! formsmith-engine: the operational half of the form compiler.
//!
//! Drives conversations with an LLM provider, compiles approved
//! specifications into schemas and public forms, and tracks artifacts
//! through their lifecycle. All state lives behind a
//! [`formsmith_storage::FormStorage`].

pub mod actor;
pub mod artifact;
mod audit;
pub mod config;
pub mod conversation;
pub mod derive;
pub mod error;
pub mod llm;
pub mod prompt;
mod service;
pub mod submission;
pub mod synthesize;

pub use actor::Actor;
pub use artifact::{ApprovalResponse, GenerateResponse, RejectionResponse};
pub use config::{AiConfig, ConfigError, ConfigProvider, FileConfig, Provider, StaticConfig};
pub use conversation::{ImportedDraft, SessionStarted, TurnResponse};
pub use derive::DerivedForm;
pub use error::{EngineError, ErrorKind};
pub use llm::{LlmClient, LlmError, ProviderRouter};
pub use service::Engine;
pub use submission::{PublicFormSummary, SubmissionOrigin};
pub use synthesize::Synthesis;

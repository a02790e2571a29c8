use std::sync::Arc;

use formsmith_core::{KeywordTutorialFilter, ResponseFilter};
use formsmith_storage::FormStorage;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::config::ConfigProvider;
use crate::llm::LlmClient;

/// The engine behind every Formsmith operation.
///
/// Holds the store, the LLM boundary, the configuration provider and the
/// tutorial filter. Each operation runs to completion on its own and commits
/// the store after every persistence step.
pub struct Engine<S: FormStorage> {
    pub(crate) storage: Arc<S>,
    pub(crate) llm: Arc<dyn LlmClient>,
    pub(crate) config: Arc<dyn ConfigProvider>,
    pub(crate) filter: Arc<dyn ResponseFilter>,
}

impl<S: FormStorage> Engine<S> {
    pub fn new(storage: Arc<S>, llm: Arc<dyn LlmClient>, config: Arc<dyn ConfigProvider>) -> Self {
        Engine {
            storage,
            llm,
            config,
            filter: Arc::new(KeywordTutorialFilter::default()),
        }
    }

    /// Replace the tutorial filter.
    pub fn with_filter(mut self, filter: Arc<dyn ResponseFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

/// Current UTC time as an RFC 3339 string.
pub(crate) fn timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

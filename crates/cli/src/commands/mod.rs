pub(crate) mod artifact;
pub(crate) mod chat;
pub(crate) mod form;
pub(crate) mod spec;

use std::fmt::Display;
use std::path::Path;
use std::process;
use std::sync::Arc;

use formsmith_core::{export, FormSpec};
use formsmith_engine::{Actor, ConfigProvider, Engine, FileConfig, ProviderRouter};
use formsmith_storage::MemoryStorage;

use crate::{print_json, report_error, OutputFormat};

/// Everything a store-backed subcommand needs.
pub(crate) struct Context {
    pub engine: Engine<MemoryStorage>,
    pub actor: Actor,
    pub output: OutputFormat,
    pub quiet: bool,
}

impl Context {
    /// Open the store and wire the engine to the file configuration. Exits
    /// on a store that cannot be read.
    pub async fn open(
        store: &Path,
        config: &Path,
        actor: &str,
        guest: bool,
        output: OutputFormat,
        quiet: bool,
    ) -> Context {
        let storage = match MemoryStorage::open(store).await {
            Ok(s) => s,
            Err(e) => {
                report_error(&e.to_string(), output, quiet);
                process::exit(1);
            }
        };
        let config: Arc<dyn ConfigProvider> = Arc::new(FileConfig::new(config));
        let llm = Arc::new(ProviderRouter::new(config.clone()));
        let actor = if guest {
            Actor::guest()
        } else {
            Actor::new(actor, true)
        };
        Context {
            engine: Engine::new(Arc::new(storage), llm, config),
            actor,
            output,
            quiet,
        }
    }

    /// Report `err` and exit with status 1.
    pub fn fail(&self, err: impl Display) -> ! {
        report_error(&err.to_string(), self.output, self.quiet);
        process::exit(1);
    }

    /// Print `value` as JSON, or the text rendering in text mode.
    pub fn emit<T: serde::Serialize>(&self, value: &T, text: impl FnOnce() -> String) {
        if self.quiet {
            return;
        }
        match self.output {
            OutputFormat::Json => print_json(value),
            OutputFormat::Text => println!("{}", text()),
        }
    }
}

/// Read a specification file in either the simplified or the export shape.
pub(crate) fn load_spec(path: &Path) -> Result<FormSpec, String> {
    let src = std::fs::read_to_string(path)
        .map_err(|e| format!("error reading file '{}': {}", path.display(), e))?;
    let value: serde_json::Value = serde_json::from_str(&src)
        .map_err(|e| format!("error parsing JSON in '{}': {}", path.display(), e))?;
    FormSpec::from_value(export::normalize(value))
        .map_err(|e| format!("unreadable specification in '{}': {}", path.display(), e))
}

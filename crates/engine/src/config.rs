//! AI provider configuration.
//!
//! Configuration is read through a [`ConfigProvider`] on every call. Tests
//! inject a [`StaticConfig`]; the CLI uses a [`FileConfig`] that re-reads its
//! TOML file.
//!
//! # Example
//!
//! ```toml
//! provider = "anthropic"
//! anthropic_api_key = "sk-ant-..."
//! anthropic_model = "claude-3-sonnet-20240229"
//! max_tokens = 2000
//! temperature = 0.7
//! web_module = "Website"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-sonnet-20240229";

/// Environment variable selecting the provider.
pub const PROVIDER_ENV: &str = "FORMSMITH_PROVIDER";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn key_env(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Provider::Gemini => "Gemini",
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic",
        };
        f.write_str(s)
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read '{path}': {message}")]
    Io { path: PathBuf, message: String },

    #[error("could not parse '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported LLM provider: {0}")]
    UnknownProvider(String),

    #[error("{0} API key not configured")]
    MissingApiKey(Provider),
}

/// Settings for the LLM provider and for schema synthesis defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub provider: Provider,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    /// Replaces the built-in system prompt when set.
    pub system_prompt: Option<String>,
    /// Module for web-accessible schemas without an explicit module.
    pub web_module: String,
    /// Module for internal schemas without an explicit module.
    pub internal_module: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            provider: Provider::Gemini,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            anthropic_api_key: None,
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            system_prompt: None,
            web_module: "Website".to_string(),
            internal_module: "Custom".to_string(),
            max_tokens: 2000,
            temperature: 0.7,
        }
    }
}

impl AiConfig {
    /// Read a TOML configuration file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply overrides from the process environment.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; empty values are ignored.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(p) = get(PROVIDER_ENV) {
            self.provider = p.parse()?;
        }
        if let Some(k) = get(Provider::Gemini.key_env()) {
            self.gemini_api_key = Some(k);
        }
        if let Some(k) = get(Provider::OpenAi.key_env()) {
            self.openai_api_key = Some(k);
        }
        if let Some(k) = get(Provider::Anthropic.key_env()) {
            self.anthropic_api_key = Some(k);
        }
        Ok(self)
    }

    /// The trimmed, non-empty API key for `provider`.
    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::Gemini => &self.gemini_api_key,
            Provider::OpenAi => &self.openai_api_key,
            Provider::Anthropic => &self.anthropic_api_key,
        };
        key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn model(&self, provider: Provider) -> &str {
        match provider {
            Provider::Gemini => &self.gemini_model,
            Provider::OpenAi => &self.openai_model,
            Provider::Anthropic => &self.anthropic_model,
        }
    }

    /// Module assigned to a synthesized schema that names none.
    pub fn default_module(&self, web_accessible: bool) -> &str {
        if web_accessible {
            &self.web_module
        } else {
            &self.internal_module
        }
    }

    /// Check that the selected provider can be called.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.api_key(self.provider) {
            Some(_) => Ok(()),
            None => Err(ConfigError::MissingApiKey(self.provider)),
        }
    }
}

/// Supplies the current configuration to the components that need it.
pub trait ConfigProvider: Send + Sync {
    fn config(&self) -> Result<AiConfig, ConfigError>;
}

/// A fixed configuration value.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig(pub AiConfig);

impl ConfigProvider for StaticConfig {
    fn config(&self) -> Result<AiConfig, ConfigError> {
        Ok(self.0.clone())
    }
}

/// Configuration re-read from a TOML file on every call, with environment
/// overrides applied. A missing file yields the defaults.
#[derive(Debug, Clone)]
pub struct FileConfig {
    pub path: PathBuf,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileConfig { path: path.into() }
    }
}

impl ConfigProvider for FileConfig {
    fn config(&self) -> Result<AiConfig, ConfigError> {
        let base = if self.path.exists() {
            AiConfig::load(&self.path)?
        } else {
            AiConfig::default()
        };
        base.with_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AiConfig::default();
        assert_eq!(cfg.provider, Provider::Gemini);
        assert_eq!(cfg.model(Provider::Gemini), "gemini-2.5-flash");
        assert_eq!(cfg.model(Provider::OpenAi), "gpt-4");
        assert_eq!(cfg.model(Provider::Anthropic), "claude-3-sonnet-20240229");
        assert_eq!(cfg.max_tokens, 2000);
        assert_eq!(cfg.default_module(true), "Website");
        assert_eq!(cfg.default_module(false), "Custom");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: AiConfig = toml::from_str(
            "provider = \"openai\"\nopenai_api_key = \"sk-test\"\ntemperature = 0.2\n",
        )
        .unwrap();
        assert_eq!(cfg.provider, Provider::OpenAi);
        assert_eq!(cfg.api_key(Provider::OpenAi), Some("sk-test"));
        assert_eq!(cfg.openai_model, "gpt-4");
        assert!((cfg.temperature - 0.2).abs() < f32::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn missing_key_names_the_provider() {
        let cfg = AiConfig {
            provider: Provider::Anthropic,
            anthropic_api_key: Some("   ".into()),
            ..AiConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.to_string(), "Anthropic API key not configured");
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("FORMSMITH_PROVIDER", "anthropic"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
            ("GEMINI_API_KEY", ""),
        ]
        .into_iter()
        .collect();
        let cfg = AiConfig {
            gemini_api_key: Some("from-file".into()),
            ..AiConfig::default()
        }
        .with_overrides(|k| env.get(k).map(|v| v.to_string()))
        .unwrap();
        assert_eq!(cfg.provider, Provider::Anthropic);
        assert_eq!(cfg.api_key(Provider::Anthropic), Some("sk-ant"));
        assert_eq!(cfg.api_key(Provider::Gemini), Some("from-file"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = "mistral".parse::<Provider>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported LLM provider: mistral");
    }

    #[test]
    fn file_config_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formsmith.toml");
        std::fs::write(&path, "web_module = \"Portal\"\n").unwrap();
        let cfg = FileConfig::new(&path).config().unwrap();
        assert_eq!(cfg.web_module, "Portal");

        std::fs::write(&path, "web_module = \"Intake\"\n").unwrap();
        let cfg = FileConfig::new(&path).config().unwrap();
        assert_eq!(cfg.web_module, "Intake");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formsmith.toml");
        std::fs::write(&path, "provider = [").unwrap();
        assert!(matches!(
            AiConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}

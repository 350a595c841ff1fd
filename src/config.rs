use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "aipipe";
const CONFIG_FILE: &str = "config.toml";

/// API key value meaning "send no Authorization header".
const NO_API_KEY: &str = "n/a";

const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1";
const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Key and endpoint configured explicitly
    Custom,
    Groq,
    OpenAI,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelChoice {
    #[default]
    Default,
    Fast,
    Reasoning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend: Backend,
    pub endpoint: String,
    /// `None` when requests go out unauthenticated
    pub api_key: Option<String>,
    pub default_model: String,
    pub fast_model: String,
    pub reasoning_model: String,
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    endpoint: Option<String>,
    api_key: Option<String>,
    default_model: Option<String>,
    fast_model: Option<String>,
    reasoning_model: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let file_config = config_dir()
            .map(|dir| load_file_config(&dir.join(CONFIG_FILE)))
            .unwrap_or_default();
        let config = Self::resolve(file_config, |name| env::var(name).ok())?;
        tracing::debug!(
            backend = ?config.backend,
            endpoint = %config.endpoint,
            "resolved configuration"
        );
        Ok(config)
    }

    pub fn model(&self, choice: ModelChoice) -> &str {
        match choice {
            ModelChoice::Default => &self.default_model,
            ModelChoice::Fast => &self.fast_model,
            ModelChoice::Reasoning => &self.reasoning_model,
        }
    }

    /// Environment first, then the file, then per-backend defaults.
    fn resolve(file_config: FileConfig, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let (backend, api_key) = Self::resolve_api_key(&file_config, &var)?;
        let endpoint = Self::resolve_endpoint(backend, &file_config, &var)?;

        let (default_model, fast_model, reasoning_model) = match backend {
            Backend::OpenAI => ("gpt-4o", "gpt-4o-mini", "o3-mini"),
            Backend::Groq | Backend::Custom => (
                "llama-3.3-70b-versatile",
                "llama-3.1-8b-instant",
                "qwen-2.5-32b",
            ),
        };

        let pick = |env_name: &str, file_value: Option<String>, fallback: &str| {
            var(env_name)
                .or(file_value)
                .unwrap_or_else(|| fallback.to_string())
        };

        Ok(Config {
            backend,
            endpoint,
            api_key: Some(api_key).filter(|key| key != NO_API_KEY),
            default_model: pick("AIPIPE_MODEL", file_config.default_model, default_model),
            fast_model: pick("AIPIPE_FAST_MODEL", file_config.fast_model, fast_model),
            reasoning_model: pick(
                "AIPIPE_REASONING_MODEL",
                file_config.reasoning_model,
                reasoning_model,
            ),
        })
    }

    fn resolve_api_key(
        file_config: &FileConfig,
        var: &impl Fn(&str) -> Option<String>,
    ) -> Result<(Backend, String)> {
        // Priority: AIPIPE_API_KEY > config file > provider-specific env vars
        if let Some(key) = var("AIPIPE_API_KEY") {
            return Ok((Backend::Custom, key));
        }

        if let Some(key) = &file_config.api_key {
            return Ok((Backend::Custom, key.clone()));
        }

        if let Some(key) = var("GROQ_API_KEY") {
            return Ok((Backend::Groq, key));
        }

        if let Some(key) = var("OPENAI_API_KEY") {
            return Ok((Backend::OpenAI, key));
        }

        Err(Error::Config(
            "No API key found. Set AIPIPE_API_KEY, add api_key to ~/.config/aipipe/config.toml, \
             or set GROQ_API_KEY or OPENAI_API_KEY"
                .to_string(),
        ))
    }

    fn resolve_endpoint(
        backend: Backend,
        file_config: &FileConfig,
        var: &impl Fn(&str) -> Option<String>,
    ) -> Result<String> {
        let endpoint = var("AIPIPE_ENDPOINT")
            .or_else(|| file_config.endpoint.clone())
            .or_else(|| match backend {
                Backend::Groq => Some(GROQ_ENDPOINT.to_string()),
                Backend::OpenAI => Some(OPENAI_ENDPOINT.to_string()),
                Backend::Custom => None,
            })
            .ok_or_else(|| {
                Error::Config(
                    "A custom API key needs an endpoint. Set AIPIPE_ENDPOINT or add endpoint \
                     to the config file"
                        .to_string(),
                )
            })?;

        Ok(endpoint.trim_end_matches('/').to_string())
    }
}

/// `$XDG_CONFIG_HOME/aipipe`, falling back to `~/.config/aipipe`.
pub fn config_dir() -> Option<PathBuf> {
    let base = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .ok()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;

    Some(base.join(APP_DIR))
}

fn load_file_config(path: &Path) -> FileConfig {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return FileConfig::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
            return FileConfig::default();
        }
    };

    toml::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
        FileConfig::default()
    })
}

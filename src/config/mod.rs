use crate::cli::Args;
use crate::core::error::ChatError;
use crate::knowledge::DEFAULT_KNOWLEDGE_PATH;
use crate::providers::openai::DEFAULT_BASE_URL;
use crate::settings::{Model, Settings, Temperature};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// The API credential. Never printed.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Resolves the key through `lookup`; a missing or blank value is a
    /// configuration error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ChatError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(API_KEY_ENV) {
            Some(key) if !key.trim().is_empty() => Ok(ApiKey(key.trim().to_string())),
            _ => Err(ChatError::Configuration(format!(
                "{} is not set; export it before starting kbchat",
                API_KEY_ENV
            ))),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Optional defaults read from `~/.kbchat/config.yaml`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: Option<Model>,
    pub temperature: Option<f32>,
    pub base_url: Option<String>,
    pub knowledge_path: Option<PathBuf>,
    pub include_knowledge: Option<bool>,
}

impl Config {
    fn config_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join(".kbchat").join("config.yaml")
    }

    pub fn load() -> Result<Config, ChatError> {
        Self::load_from(&Self::config_path())
    }

    /// A missing file yields the defaults; an unparsable one is an error.
    pub fn load_from(path: &Path) -> Result<Config, ChatError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str::<Config>(&contents)
            .map_err(|e| ChatError::Configuration(format!("Parse {}: {}", path.display(), e)))
    }

    pub fn knowledge_path(&self, args: &Args) -> PathBuf {
        args.knowledge
            .clone()
            .or_else(|| self.knowledge_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KNOWLEDGE_PATH))
    }

    pub fn base_url(&self, args: &Args) -> String {
        args.base_url
            .clone()
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Initial control values: command line first, then this file, then
    /// built-in defaults.
    pub fn settings(&self, args: &Args, knowledge: &str) -> Result<Settings, ChatError> {
        let defaults = Settings::for_knowledge(knowledge);

        let temperature = match (args.temperature, self.temperature) {
            (Some(t), _) => t,
            (None, Some(t)) => Temperature::new(t)
                .map_err(|e| ChatError::Configuration(format!("temperature in config: {}", e)))?,
            (None, None) => defaults.temperature,
        };

        let include_knowledge = if args.no_knowledge {
            false
        } else {
            self.include_knowledge
                .unwrap_or(defaults.include_knowledge)
        };

        Ok(Settings {
            model: args.model.or(self.model).unwrap_or(defaults.model),
            temperature,
            include_knowledge,
        })
    }
}

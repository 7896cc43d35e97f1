use crate::errors::{AssistantError, AssistantResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "louis-ai";
pub const DEFAULT_WEBSITE_URL: &str = "https://stlouisdemojhs.com";
pub const OPENROUTER_API_KEY_ENV: &str = "VITE_OPENROUTER_API_KEY";
pub const GROQ_API_KEY_ENV: &str = "VITE_GROQ_API_KEY";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Settings for one upstream LLM provider
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    /// Overrides the provider's public endpoint root
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ProviderConfig {
    /// Merges this config with another, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            api_key: other.api_key.clone().or_else(|| self.api_key.clone()),
            model_name: other.model_name.clone().or_else(|| self.model_name.clone()),
            base_url: other.base_url.clone().or_else(|| self.base_url.clone()),
            temperature: other.temperature.or(self.temperature),
            max_tokens: other.max_tokens.or(self.max_tokens),
        }
    }

    /// API key, treating a blank value as absent
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Configuration for the assistant backend
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AssistantConfig {
    pub website_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    #[serde(default)]
    pub openrouter: ProviderConfig,
    #[serde(default)]
    pub groq: ProviderConfig,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            website_url: Some(DEFAULT_WEBSITE_URL.to_string()),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: Some(DEFAULT_CONNECT_TIMEOUT_SECS),
            openrouter: ProviderConfig::default(),
            groq: ProviderConfig::default(),
        }
    }
}

impl AssistantConfig {
    /// Loads configuration from a file if it exists, otherwise returns the default config
    pub fn load_from_file(path: &Path) -> AssistantResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            AssistantError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            AssistantError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        Ok(Self::default().merge(&config))
    }

    /// Saves configuration to a file
    pub fn save_to_file(&self, path: &Path) -> AssistantResult<()> {
        let content = toml::to_string(self).map_err(|e| {
            AssistantError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AssistantError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(path, content).map_err(|e| {
            AssistantError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Merges this config with another config, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            website_url: other.website_url.clone().or_else(|| self.website_url.clone()),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
            connect_timeout_secs: other.connect_timeout_secs.or(self.connect_timeout_secs),
            openrouter: self.openrouter.merge(&other.openrouter),
            groq: self.groq.merge(&other.groq),
        }
    }

    /// Applies API keys from the process environment.
    ///
    /// A missing variable leaves the configured key untouched; a provider
    /// without any key fails on its first call instead of here.
    pub fn with_env_overrides(self) -> Self {
        self.with_env_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(OPENROUTER_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.openrouter.api_key = Some(key);
        }
        if let Some(key) = lookup(GROQ_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.groq.api_key = Some(key);
        }
        self
    }

    pub fn website_url(&self) -> &str {
        self.website_url.as_deref().unwrap_or(DEFAULT_WEBSITE_URL)
    }

    /// Deadline applied to each provider call
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }
}

/// Helper function to get default config directory
pub fn get_default_config_dir(app_name: &str) -> AssistantResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        AssistantError::ConfigError("Could not determine home directory".to_string())
    })?;

    Ok(home_dir.join(".config").join(app_name))
}

/// Helper function to get default config file path
pub fn get_default_config_file(app_name: &str) -> AssistantResult<PathBuf> {
    let config_dir = get_default_config_dir(app_name)?;
    Ok(config_dir.join("config.toml"))
}

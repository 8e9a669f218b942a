//! Configuration management for pdfqa
//!
//! Settings are resolved once at startup: defaults, then `~/.pdfqa/config.toml`,
//! then environment variables (a `.env` file is honoured). The resulting
//! [`Config`] is passed by reference into the client and pipeline.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo-0613";
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_VARS: &[&str] = &["OPENROUTER_API_KEY", "OPENROUTER_KEY"];
pub const MODEL_VAR: &str = "OPENROUTER_MODEL";
pub const ENDPOINT_VAR: &str = "OPENROUTER_API_URL";

/// pdfqa configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API key for the completion service. Usually supplied via environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model identifier sent with every request
    pub model: String,
    /// Chat-completions endpoint URL
    pub endpoint: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum characters per chunk sent to the model
    pub max_chunk_chars: usize,
    /// How many chunk summaries may be in flight at once
    pub summary_concurrency: usize,
    /// Retries for transient failures (429/5xx, connection errors)
    pub max_retries: u32,
    /// Backoff before the first retry; doubles on each subsequent retry
    pub backoff_base_ms: u64,
    /// Version of config schema (for future migrations)
    pub version: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 20,
            max_chunk_chars: 3500,
            summary_concurrency: 1,
            max_retries: 3,
            backoff_base_ms: 300,
            version: 1,
        }
    }
}

impl Config {
    /// Get the config file path (~/.pdfqa/config.toml)
    pub fn path() -> Result<PathBuf> {
        Ok(pdfqa_dir()?.join("config.toml"))
    }

    /// Check if a config file exists
    pub fn exists() -> bool {
        Self::path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Load config from disk, or return None if it doesn't exist
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(Some(config))
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Resolve the effective configuration: file (or defaults) plus environment.
    pub fn resolve() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::load()?.unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overlay values from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = API_KEY_VARS.iter().find_map(|var| non_empty(var)) {
            self.api_key = Some(key);
        }
        if let Some(model) = non_empty(MODEL_VAR) {
            self.model = model;
        }
        if let Some(endpoint) = non_empty(ENDPOINT_VAR) {
            self.endpoint = endpoint;
        }
    }

    /// Copy with a per-session API key override. Blank overrides are ignored.
    pub fn with_api_key(&self, key: Option<&str>) -> Self {
        let mut config = self.clone();
        if let Some(key) = key.map(str::trim).filter(|k| !k.is_empty()) {
            config.api_key = Some(key.to_string());
        }
        config
    }

    pub fn with_model(&self, model: Option<&str>) -> Self {
        let mut config = self.clone();
        if let Some(model) = model.map(str::trim).filter(|m| !m.is_empty()) {
            config.model = model.to_string();
        }
        config
    }

    pub fn with_endpoint(&self, endpoint: Option<&str>) -> Self {
        let mut config = self.clone();
        if let Some(endpoint) = endpoint.map(str::trim).filter(|e| !e.is_empty()) {
            config.endpoint = endpoint.to_string();
        }
        config
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    /// API key with everything but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        match self.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => {
                let chars: Vec<char> = key.chars().collect();
                let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
                format!("****{}", tail)
            }
            None => "(not set)".to_string(),
        }
    }
}

/// Get the base pdfqa directory path (~/.pdfqa)
pub fn pdfqa_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".pdfqa"))
}

//! Configuration file management for groundgen
//!
//! Values live in ~/.groundgen/config.toml and can be overridden by
//! environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env::apis as env_apis;
use crate::services::google_ai::client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::services::google_ai::GroundingConfig;

const KEYS: [&str; 3] = ["api-key", "model", "base-url"];

/// Where an effective setting came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrigin {
    Env,
    File,
    Default,
}

impl ValueOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            ValueOrigin::Env => "env",
            ValueOrigin::File => "file",
            ValueOrigin::Default => "default",
        }
    }
}

/// A setting after env > file > default resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    pub key: &'static str,
    pub value: Option<String>,
    pub origin: ValueOrigin,
}

impl ResolvedValue {
    /// Value for printing; the API key is always masked.
    pub fn display_value(&self) -> String {
        match &self.value {
            None => "(not set)".to_string(),
            Some(value) if self.key == "api-key" => mask_api_key(value),
            Some(value) => value.clone(),
        }
    }

    /// Environment variable that overrides this key.
    pub fn env_var(&self) -> &'static str {
        env_var_for(self.key)
    }
}

/// Configuration structure matching config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Config {
    /// Get the config file path (~/.groundgen/config.toml)
    pub fn get_config_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Could not find home directory")?;
        Ok(home_dir.join(".groundgen").join("config.toml"))
    }

    /// Load configuration from the default path.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        // The file holds an API key: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(config_path, permissions).with_context(|| {
                format!(
                    "Failed to set permissions on config file: {}",
                    config_path.display()
                )
            })?;
        }

        Ok(())
    }

    fn slot(&mut self, key: &str) -> Result<&mut Option<String>> {
        match canonical_key(key)? {
            "api-key" => Ok(&mut self.api.api_key),
            "model" => Ok(&mut self.api.model),
            _ => Ok(&mut self.api.base_url),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match normalize_key(key) {
            "api-key" => self.api.api_key.clone(),
            "model" => self.api.model.clone(),
            "base-url" => self.api.base_url.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        *self.slot(key)? = Some(value);
        Ok(())
    }

    pub fn unset(&mut self, key: &str) -> Result<()> {
        *self.slot(key)? = None;
        Ok(())
    }

    /// Effective value of one key and where it came from.
    pub fn effective(&self, key: &str) -> Result<ResolvedValue> {
        Ok(self.lookup(canonical_key(key)?, &env_value))
    }

    /// Effective values of every key, in `KEYS` order.
    pub fn effective_values(&self) -> Vec<ResolvedValue> {
        KEYS.iter()
            .map(|&key| self.lookup(key, &env_value))
            .collect()
    }

    /// Builds a client config with priority: environment variable > config file > default.
    pub fn resolve(&self) -> GroundingConfig {
        self.resolve_with(&env_value)
    }

    fn resolve_with(&self, env: &dyn Fn(&str) -> Option<String>) -> GroundingConfig {
        let value = |key| self.lookup(key, env).value.unwrap_or_default();

        let mut resolved = GroundingConfig::new(value("api-key"))
            .with_model(value("model"))
            .with_base_url(value("base-url"));
        if let Some(secs) = env(env_apis::TIMEOUT).and_then(|s| s.parse::<u64>().ok()) {
            resolved.timeout = Duration::from_secs(secs);
        }
        resolved
    }

    fn lookup(&self, key: &'static str, env: &dyn Fn(&str) -> Option<String>) -> ResolvedValue {
        let (value, origin) = if let Some(value) = env(env_var_for(key)) {
            (Some(value), ValueOrigin::Env)
        } else if let Some(value) = self.get(key) {
            (Some(value), ValueOrigin::File)
        } else {
            (default_for(key), ValueOrigin::Default)
        };

        ResolvedValue { key, value, origin }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn env_var_for(key: &str) -> &'static str {
    match key {
        "api-key" => env_apis::GEMINI_API_KEY,
        "model" => env_apis::MODEL,
        _ => env_apis::BASE_URL,
    }
}

fn default_for(key: &str) -> Option<String> {
    match key {
        "model" => Some(DEFAULT_MODEL.to_string()),
        "base-url" => Some(DEFAULT_BASE_URL.to_string()),
        _ => None,
    }
}

fn canonical_key(key: &str) -> Result<&'static str> {
    let normalized = normalize_key(key);
    KEYS.iter()
        .copied()
        .find(|known| *known == normalized)
        .with_context(|| format!("Unknown config key: {key}. Valid keys: {}", KEYS.join(", ")))
}

fn normalize_key(key: &str) -> &str {
    match key {
        "api_key" | "api-key" | "gemini-api-key" => "api-key",
        "base_url" | "base-url" => "base-url",
        "model" => "model",
        other => other,
    }
}

/// Load the config file and resolve it against the environment.
pub fn load_grounding_config(timeout: Option<Duration>) -> Result<GroundingConfig> {
    let mut resolved = Config::load()?.resolve();
    if let Some(timeout) = timeout {
        resolved.timeout = timeout;
    }
    Ok(resolved)
}

/// Mask API key for display (show first 4 and last 4 characters)
fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

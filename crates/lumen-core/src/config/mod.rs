//! Configuration management for Lumen.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults, then a small set of environment variables is applied on top.
//! The resulting values are passed explicitly into the cache and pipeline
//! constructors; nothing below this module reads the environment.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Lumen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resource limits
    pub limits: LimitsConfig,

    /// Result cache settings
    pub cache: CacheConfig,

    /// URL fetch settings
    pub fetch: FetchConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Output settings
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from the default location, then apply environment
    /// overrides.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::read_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env(std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path)?;
        config.apply_env(std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file as written, ignoring the environment.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/rs.lumen.lumen/config.toml
    /// - Linux: ~/.config/lumen/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\lumen\config\config.toml
    ///
    /// Falls back to ~/.lumen/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("rs", "lumen", "lumen")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".lumen").join("config.toml")
            })
    }

    /// Apply `LUMEN_*` overrides from an environment snapshot.
    ///
    /// Recognized keys: `LUMEN_CACHE_ENABLED`, `LUMEN_CACHE_MAX_SIZE`,
    /// `LUMEN_CACHE_TTL_SECONDS`, `LUMEN_LOG_LEVEL`, `LUMEN_LOG_FORMAT`.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let value = value.trim();
            match key.as_str() {
                "LUMEN_CACHE_ENABLED" => self.cache.enabled = parse_flag(&key, value)?,
                "LUMEN_CACHE_MAX_SIZE" => self.cache.max_entries = parse_number(&key, value)?,
                "LUMEN_CACHE_TTL_SECONDS" => self.cache.ttl_seconds = parse_number(&key, value)?,
                "LUMEN_LOG_LEVEL" => self.logging.level = value.to_lowercase(),
                "LUMEN_LOG_FORMAT" => self.logging.format = value.to_lowercase(),
                _ => {}
            }
        }
        Ok(())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::ValidationError(format!(
            "{key} must be a boolean, got '{value}'"
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| {
        ConfigError::ValidationError(format!("{key} must be a non-negative integer, got '{value}'"))
    })
}

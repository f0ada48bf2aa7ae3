//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{Config, ANALYSIS_TIMEOUT_MS, MAX_FILE_SIZE_BYTES, MAX_WORKING_DIMENSION};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.limits;
        if limits.max_file_size_bytes == 0 || limits.max_file_size_bytes > MAX_FILE_SIZE_BYTES {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_file_size_bytes must be between 1 and {MAX_FILE_SIZE_BYTES}"
            )));
        }
        if limits.max_working_dimension == 0 || limits.max_working_dimension > MAX_WORKING_DIMENSION
        {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_working_dimension must be between 1 and {MAX_WORKING_DIMENSION}"
            )));
        }
        if limits.max_decode_dimension < limits.max_working_dimension {
            return Err(ConfigError::ValidationError(
                "limits.max_decode_dimension must be >= limits.max_working_dimension".into(),
            ));
        }
        if limits.timeout_ms == 0 || limits.timeout_ms > ANALYSIS_TIMEOUT_MS {
            return Err(ConfigError::ValidationError(format!(
                "limits.timeout_ms must be between 1 and {ANALYSIS_TIMEOUT_MS}"
            )));
        }
        if self.cache.enabled && self.cache.max_entries == 0 {
            return Err(ConfigError::ValidationError(
                "cache.max_entries must be > 0 when the cache is enabled".into(),
            ));
        }
        if self.cache.enabled && self.cache.ttl_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "cache.ttl_seconds must be > 0 when the cache is enabled".into(),
            ));
        }
        if self.fetch.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.timeout_ms must be > 0".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                self.logging.format
            )));
        }
        Ok(())
    }
}

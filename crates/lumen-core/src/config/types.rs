//! Sub-configuration structs with defaults matching the service contract.

use serde::{Deserialize, Serialize};

/// Largest accepted payload in bytes (5 MiB).
pub const MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// Largest working dimension; bigger images are downscaled before analysis.
pub const MAX_WORKING_DIMENSION: u32 = 512;

/// Hard wall-clock budget for one analysis.
pub const ANALYSIS_TIMEOUT_MS: u64 = 2000;

/// Media types accepted for analysis.
pub const ALLOWED_MEDIA_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Resource limits to protect against problematic inputs.
///
/// The defaults are the contract maxima; a config file may tighten them but
/// validation refuses to loosen them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum payload size in bytes
    pub max_file_size_bytes: u64,

    /// Images with a longer side are resized before luminance is computed
    pub max_working_dimension: u32,

    /// Header dimensions above this are rejected before pixels are allocated
    pub max_decode_dimension: u32,

    /// Per-analysis timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            max_working_dimension: MAX_WORKING_DIMENSION,
            max_decode_dimension: 16_384,
            timeout_ms: ANALYSIS_TIMEOUT_MS,
        }
    }
}

/// Result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether analysis results are memoized
    pub enabled: bool,

    /// Maximum number of cached results
    pub max_entries: usize,

    /// Seconds after insertion before an entry is considered stale
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 128,
            ttl_seconds: 3600,
        }
    }
}

/// URL fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Download timeout in milliseconds
    pub timeout_ms: u64,

    /// Redirects followed before giving up
    pub max_redirects: usize,

    /// User-Agent header sent with requests
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_redirects: 5,
            user_agent: format!("lumen/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: bool,

    /// Replace internal failure details with a generic message
    pub redact_internal_errors: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            redact_internal_errors: true,
        }
    }
}

//! Error types for the Lumen analysis pipeline.
//!
//! Every pipeline stage fails fast with a typed [`AnalysisError`]. Each variant
//! carries enough context to reproduce the failure (limits vs. received values,
//! allowed vs. received formats) and maps to a stable error code for callers
//! that surface errors as structured objects.

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Top-level error type for Lumen operations.
#[derive(Error, Debug)]
pub enum LumenError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Analysis pipeline errors
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failures reported by an [`ImageFetcher`](crate::fetch::ImageFetcher).
///
/// URLs inside these variants are always redacted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("URL cannot be empty")]
    EmptyUrl,

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("Invalid URL scheme '{scheme}': URL must start with http:// or https://")]
    UnsupportedScheme { scheme: String },

    #[error("URL points to a private or local network address: {host}")]
    BlockedHost { host: String },

    #[error("Failed to download image from {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Image from URL exceeds maximum allowed size ({received_bytes} > {max_bytes} bytes)")]
    TooLarge { max_bytes: u64, received_bytes: u64 },

    #[error("Request timeout while downloading image from {url} after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Failed to download image from {url}: {message}")]
    Request { url: String, message: String },
}

/// Analysis errors, one variant per failure category.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Zero-length payload
    #[error("Empty image file")]
    EmptyInput,

    /// Payload exceeds the byte cap (checked before decode)
    #[error("Image exceeds maximum allowed size ({received_bytes} > {max_bytes} bytes)")]
    PayloadTooLarge { max_bytes: u64, received_bytes: u64 },

    /// Media type outside the accepted set
    #[error("Unsupported image type '{received}' (allowed: {})", .allowed.join(", "))]
    UnsupportedFormat {
        allowed: Vec<String>,
        received: String,
    },

    /// Decoding failed on accepted-format bytes
    #[error("Invalid or corrupted image file: {message}")]
    CorruptInput { message: String },

    /// Header dimensions exceed the decode bound
    #[error("Image too large to decode ({width}x{height} > {max_dimension})")]
    DimensionsTooLarge {
        width: u32,
        height: u32,
        max_dimension: u32,
    },

    /// Unknown metric identifier(s)
    #[error("Invalid metrics requested: {} (valid: {})", .invalid.join(", "), .valid.join(", "))]
    InvalidMetricRequest {
        invalid: Vec<String>,
        valid: Vec<String>,
    },

    /// Unknown edge mode identifier
    #[error("Invalid edge_mode requested: '{received}' (valid: {})", .valid.join(", "))]
    InvalidEdgeMode { received: String, valid: Vec<String> },

    /// The URL fetcher rejected the request
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Pipeline exceeded its wall-clock budget
    #[error("Analysis timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Unexpected failure inside the pipeline
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AnalysisError {
    /// Stable machine-readable identifier for this error category.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::CorruptInput { .. } => "corrupt_input",
            Self::DimensionsTooLarge { .. } => "dimensions_too_large",
            Self::InvalidMetricRequest { .. } => "invalid_metric_request",
            Self::InvalidEdgeMode { .. } => "invalid_edge_mode",
            Self::Fetch(FetchError::Timeout { .. }) => "fetch_timeout",
            Self::Fetch(_) => "fetch_rejected",
            Self::Timeout { .. } => "timeout",
            Self::Internal { .. } => "internal_failure",
        }
    }

    /// Whether the failure was caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Timeout { .. } | Self::Internal { .. })
    }

    /// Build the structured error object returned to callers.
    ///
    /// With `redact_internal`, internal failure details are replaced by a
    /// generic message.
    pub fn to_body(&self, redact_internal: bool) -> ErrorBody {
        let details = match self {
            Self::EmptyInput => serde_json::Value::Null,
            Self::Timeout { timeout_ms } => json!({ "timeout_ms": timeout_ms }),
            Self::PayloadTooLarge {
                max_bytes,
                received_bytes,
            } => json!({ "max_size_bytes": max_bytes, "received_size_bytes": received_bytes }),
            Self::UnsupportedFormat { allowed, received } => {
                json!({ "allowed_types": allowed, "received_type": received })
            }
            Self::CorruptInput { message } => json!({ "details": message }),
            Self::DimensionsTooLarge {
                width,
                height,
                max_dimension,
            } => json!({ "width": width, "height": height, "max_dimension": max_dimension }),
            Self::InvalidMetricRequest { invalid, valid } => {
                json!({ "invalid_metrics": invalid, "valid_metrics": valid })
            }
            Self::InvalidEdgeMode { received, valid } => {
                json!({ "received": received, "valid_modes": valid })
            }
            Self::Fetch(FetchError::TooLarge {
                max_bytes,
                received_bytes,
            }) => json!({ "max_size_bytes": max_bytes, "received_size_bytes": received_bytes }),
            Self::Fetch(err) => json!({ "details": err.to_string() }),
            Self::Internal { message } => {
                if redact_internal {
                    serde_json::Value::Null
                } else {
                    json!({ "details": message })
                }
            }
        };

        let message = match self {
            Self::Internal { .. } if redact_internal => "Internal server error".to_string(),
            other => other.to_string(),
        };

        ErrorBody {
            error: self.code(),
            message,
            details,
        }
    }
}

/// Serializable error object.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Error category code
    pub error: &'static str,
    /// Human-readable description
    pub message: String,
    /// Category-specific context
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

/// Convenience type alias for Lumen results.
pub type Result<T> = std::result::Result<T, LumenError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, AnalysisError>;

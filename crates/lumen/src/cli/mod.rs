//! Command implementations and helpers shared between them.

pub mod analyze;
pub mod config;
pub mod serve;

use std::path::Path;

use lumen_core::{Config, Lumen};
use serde::Serialize;

/// Media type for a local file, inferred from its extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

/// Whether an input argument should be fetched rather than read from disk.
pub fn is_url(input: &str) -> bool {
    let lower = input.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Build the analyzer with the configured cache.
pub fn build_lumen(config: Config) -> anyhow::Result<Lumen> {
    Ok(Lumen::from_config(config)?)
}

pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

//! Logging initialization and configuration.
//!
//! Uses the `tracing` ecosystem with human-readable or JSON output on stderr.
//! Stdout carries analysis results only.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// `level` is the default filter directive; `RUST_LOG` overrides it when set.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from `[logging]` config with CLI overrides.
///
/// `--verbose` raises the level to debug unless config already asks for trace.
pub fn init_from_config(
    config: &lumen_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let level = match config.logging.level.as_str() {
        "trace" => "trace",
        _ if verbose_override => "debug",
        other => other,
    };
    let json_format = json_logs_override || config.logging.format == "json";
    init(level, json_format);
}

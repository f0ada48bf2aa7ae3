//! Lumen CLI - Perceptual brightness analysis for JPEG and PNG images.
//!
//! Lumen reads an image from disk or a URL and prints brightness statistics
//! as JSON: a 0-100 brightness score, average and median luminance, a
//! luminance histogram and border-strip brightness.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a single image
//! lumen analyze photo.jpg --metrics median,histogram --edge-mode all
//!
//! # Analyze an image by URL
//! lumen analyze https://example.com/photo.png
//!
//! # Serve line-delimited JSON requests on stdin
//! lumen serve --workers 8 < requests.jsonl
//!
//! # View configuration
//! lumen config show
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Lumen - Perceptual brightness analysis for JPEG and PNG images.
#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "LUMEN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one image file or URL
    Analyze(cli::analyze::AnalyzeArgs),

    /// Answer line-delimited JSON analysis requests on stdin
    Serve(cli::serve::ServeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned()),
        None => lumen_core::Config::default_path(),
    };

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = if cli.config.is_some() {
        lumen_core::Config::load_from(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        match lumen_core::Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `lumen config path`."
                );
                lumen_core::Config::default()
            }
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Lumen v{}", lumen_core::VERSION);

    match cli.command {
        Commands::Analyze(args) => cli::analyze::execute(args, config).await,
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, &config, &config_path).await,
    }
}

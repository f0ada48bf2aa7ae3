//! Lumen Core - Embeddable image brightness analysis library.
//!
//! Lumen takes an encoded JPEG or PNG image and produces perceptual
//! brightness statistics: a 0-100 brightness score, average and median
//! luminance, a ten-bucket luminance histogram and border-strip brightness.
//!
//! # Architecture
//!
//! Lumen is a pure, per-request pipeline. The only state shared between
//! requests is an optional in-memory result cache:
//!
//! ```text
//! Bytes → Validate → (Cache) → Decode → Resize → Luminance → Metrics → JSON
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen_core::{AnalysisOptions, Config, Lumen};
//!
//! #[tokio::main]
//! async fn main() -> lumen_core::Result<()> {
//!     let lumen = Lumen::from_config(Config::load()?)?;
//!     let bytes = std::fs::read("./photo.jpg")?;
//!     let options = AnalysisOptions::parse(Some("median,histogram"), Some("all"))?;
//!
//!     let result = lumen.analyze_upload(bytes, Some("image/jpeg"), &options).await?;
//!     println!("Brightness: {}", result.brightness_score);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use cache::{CacheStats, ResultCache};
pub use config::Config;
pub use error::{AnalysisError, ConfigError, ErrorBody, FetchError, LumenError, PipelineResult, Result};
pub use fetch::{FetchedImage, HttpFetcher, ImageFetcher};
pub use pipeline::ImageAnalyzer;
pub use types::{AnalysisOptions, AnalysisResult, EdgeMode, HistogramBucket, Metric};

use std::sync::Arc;
use std::time::{Duration, Instant};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lumen analyzer - the main entry point for brightness analysis.
///
/// Cheap to share behind an `Arc`; every call is independent apart from the
/// result cache.
pub struct Lumen {
    config: Config,
    analyzer: Arc<ImageAnalyzer>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl Lumen {
    /// Create a Lumen instance with an explicit (possibly absent) cache.
    pub fn new(config: Config, cache: Option<Arc<ResultCache>>) -> Result<Self> {
        tracing::debug!("Initializing Lumen v{}", VERSION);
        let fetcher = HttpFetcher::new(&config.fetch, config.limits.max_file_size_bytes)
            .map_err(AnalysisError::from)?;
        Ok(Self {
            analyzer: Arc::new(ImageAnalyzer::new(&config, cache)),
            fetcher: Arc::new(fetcher),
            config,
        })
    }

    /// Create a Lumen instance with the cache described by `config.cache`.
    pub fn from_config(config: Config) -> Result<Self> {
        let cache = ResultCache::from_config(&config.cache);
        Self::new(config, cache)
    }

    /// Replace the URL fetcher.
    pub fn with_fetcher(mut self, fetcher: Box<dyn ImageFetcher>) -> Self {
        self.fetcher = Arc::from(fetcher);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> Option<&Arc<ResultCache>> {
        self.analyzer.cache()
    }

    /// Analyze uploaded bytes with an optional declared media type.
    pub async fn analyze_upload(
        &self,
        bytes: Vec<u8>,
        media_type: Option<&str>,
        options: &AnalysisOptions,
    ) -> PipelineResult<AnalysisResult> {
        let started = Instant::now();
        self.run(bytes, media_type.map(str::to_string), options, started)
            .await
    }

    /// Download an image and analyze it.
    ///
    /// The server's `Content-Type` is treated as the declared media type.
    /// `processing_time_ms` includes the download.
    pub async fn analyze_url(
        &self,
        url: &str,
        options: &AnalysisOptions,
    ) -> PipelineResult<AnalysisResult> {
        let started = Instant::now();
        let fetched = self.fetcher.fetch(url).await?;
        self.run(fetched.bytes, fetched.content_type, options, started)
            .await
    }

    /// Run the synchronous pipeline off the async runtime under the
    /// configured wall-clock budget.
    async fn run(
        &self,
        bytes: Vec<u8>,
        media_type: Option<String>,
        options: &AnalysisOptions,
        started: Instant,
    ) -> PipelineResult<AnalysisResult> {
        let timeout_ms = self.config.limits.timeout_ms;
        let analyzer = Arc::clone(&self.analyzer);
        let options = options.clone();

        let task = tokio::task::spawn_blocking(move || {
            analyzer.analyze(&bytes, media_type.as_deref(), &options, started)
        });

        match tokio::time::timeout(Duration::from_millis(timeout_ms), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                tracing::error!("Analysis task failed: {}", join_err);
                Err(AnalysisError::Internal {
                    message: join_err.to_string(),
                })
            }
            Err(_) => {
                tracing::warn!("Analysis exceeded {}ms budget", timeout_ms);
                Err(AnalysisError::Timeout { timeout_ms })
            }
        }
    }
}

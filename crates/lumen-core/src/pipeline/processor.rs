//! Pipeline orchestration - wires together all analysis stages.

use std::sync::Arc;
use std::time::Instant;

use crate::cache::ResultCache;
use crate::config::Config;
use crate::error::PipelineResult;
use crate::metrics::Measurements;
use crate::types::{AnalysisOptions, AnalysisResult};

use super::assemble::ResponseAssembler;
use super::decode::{format_name, ImageDecoder};
use super::hash::CacheKey;
use super::luminance::LuminanceArray;
use super::resize::Resizer;
use super::validate::Validator;

/// Runs one image through validate, cache lookup, decode, resize, luminance,
/// aggregation and assembly.
///
/// Stateless apart from the optional shared cache, so one analyzer serves any
/// number of concurrent requests.
pub struct ImageAnalyzer {
    validator: Validator,
    decoder: ImageDecoder,
    resizer: Resizer,
    cache: Option<Arc<ResultCache>>,
}

impl ImageAnalyzer {
    /// Create an analyzer with the given configuration and optional cache.
    pub fn new(config: &Config, cache: Option<Arc<ResultCache>>) -> Self {
        Self {
            validator: Validator::new(config.limits.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
            resizer: Resizer::new(config.limits.max_working_dimension),
            cache,
        }
    }

    pub fn cache(&self) -> Option<&Arc<ResultCache>> {
        self.cache.as_ref()
    }

    /// Analyze an in-memory payload.
    ///
    /// `declared` is the caller-supplied media type, if any. `started` is the
    /// request start used for `processing_time_ms`.
    pub fn analyze(
        &self,
        bytes: &[u8],
        declared: Option<&str>,
        options: &AnalysisOptions,
        started: Instant,
    ) -> PipelineResult<AnalysisResult> {
        tracing::debug!(
            "Analyzing {} bytes ({})",
            bytes.len(),
            declared.unwrap_or("undeclared")
        );

        // Validate
        let format = self.validator.validate(bytes, declared)?;
        tracing::trace!("  Validate: {:?}", started.elapsed());

        // Cache lookup
        let key = self.cache.as_ref().map(|_| CacheKey::new(bytes, options));
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(hit) = cache.get(key) {
                tracing::debug!("Cache hit for {key}");
                return Ok(ResponseAssembler::from_cache(hit, started));
            }
        }

        // Decode
        let decode_start = Instant::now();
        let decoded = self.decoder.decode(bytes, format)?;
        tracing::trace!("  Decode: {:?}", decode_start.elapsed());

        // Resize
        let resize_start = Instant::now();
        let working = self.resizer.bound(decoded.pixels)?;
        tracing::trace!(
            "  Resize: {:?} ({}x{})",
            resize_start.elapsed(),
            working.width(),
            working.height()
        );

        // Luminance and aggregators
        let metrics_start = Instant::now();
        let luminance = LuminanceArray::from_pixels(&working);
        let measurements = Measurements::compute(&luminance, options);
        tracing::trace!("  Metrics: {:?}", metrics_start.elapsed());

        let result =
            ResponseAssembler::assemble(measurements, decoded.width, decoded.height, started);

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.put(key, result.clone());
        }

        tracing::debug!(
            "Analyzed {} {}x{} in {:?}: score {}",
            format_name(decoded.format),
            result.width,
            result.height,
            started.elapsed(),
            result.brightness_score
        );

        Ok(result)
    }
}

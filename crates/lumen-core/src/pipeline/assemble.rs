//! Response assembly.

use std::time::Instant;

use crate::metrics::{round2, Measurements};
use crate::types::{AnalysisResult, ALGORITHM};

/// Builds the public [`AnalysisResult`] from aggregator output.
///
/// Only requested fields are populated; the reported dimensions are those of
/// the decoded original, not the working copy.
pub struct ResponseAssembler;

impl ResponseAssembler {
    pub fn assemble(
        measurements: Measurements,
        width: u32,
        height: u32,
        started: Instant,
    ) -> AnalysisResult {
        let (edge_brightness_score, edge_average_luminance, edge_mode) = match measurements.edge {
            Some(edge) => (Some(edge.score), Some(edge.average), Some(edge.mode)),
            None => (None, None, None),
        };

        AnalysisResult {
            brightness_score: measurements.score,
            average_luminance: measurements.average,
            edge_brightness_score,
            edge_average_luminance,
            edge_mode,
            median_luminance: measurements.median,
            histogram: measurements.histogram,
            width,
            height,
            algorithm: ALGORITHM.to_string(),
            processing_time_ms: elapsed_ms(started),
            cached: false,
        }
    }

    /// Re-stamp a cached result for the current request.
    pub fn from_cache(mut result: AnalysisResult, started: Instant) -> AnalysisResult {
        result.cached = true;
        result.processing_time_ms = elapsed_ms(started);
        result
    }
}

/// Milliseconds since `started`, two decimals.
pub fn elapsed_ms(started: Instant) -> f64 {
    round2(started.elapsed().as_secs_f64() * 1000.0)
}

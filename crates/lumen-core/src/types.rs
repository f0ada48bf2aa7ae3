//! Core data types for the Lumen analysis pipeline.
//!
//! Raw selector strings are parsed into [`AnalysisOptions`] at the boundary;
//! everything past that point works with closed enums only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

/// Identifier of the luminance formula used for every result.
pub const ALGORITHM: &str = "rec709";

/// A metric that can be requested from the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Brightness score and average luminance (always computed)
    Brightness,
    /// Median luminance
    Median,
    /// Ten-bucket luminance distribution
    Histogram,
}

impl Metric {
    /// Every metric, in canonical order.
    pub const ALL: [Metric; 3] = [Metric::Brightness, Metric::Median, Metric::Histogram];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Median => "median",
            Self::Histogram => "histogram",
        }
    }

    fn valid_names() -> Vec<String> {
        Self::ALL.iter().map(|m| m.as_str().to_string()).collect()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| AnalysisError::InvalidMetricRequest {
                invalid: vec![normalized],
                valid: Self::valid_names(),
            })
    }
}

/// Which border strips feed the edge brightness measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMode {
    /// Leftmost and rightmost 10% of columns
    LeftRight,
    /// Topmost and bottommost 10% of rows
    TopBottom,
    /// All four strips
    All,
}

impl EdgeMode {
    /// Every edge mode, in canonical order.
    pub const ALL: [EdgeMode; 3] = [EdgeMode::LeftRight, EdgeMode::TopBottom, EdgeMode::All];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LeftRight => "left_right",
            Self::TopBottom => "top_bottom",
            Self::All => "all",
        }
    }
}

impl fmt::Display for EdgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| AnalysisError::InvalidEdgeMode {
                received: s.to_string(),
                valid: Self::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            })
    }
}

/// Validated request configuration.
///
/// Together with the image content this fully determines the shape of the
/// [`AnalysisResult`]. Brightness is always part of the metric set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisOptions {
    metrics: BTreeSet<Metric>,
    edge_mode: Option<EdgeMode>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::new([], None)
    }
}

impl AnalysisOptions {
    /// Build options from already-typed selectors.
    pub fn new(metrics: impl IntoIterator<Item = Metric>, edge_mode: Option<EdgeMode>) -> Self {
        let mut metrics: BTreeSet<Metric> = metrics.into_iter().collect();
        metrics.insert(Metric::Brightness);
        Self { metrics, edge_mode }
    }

    /// Parse raw selectors: a comma-separated metric list and an edge mode.
    ///
    /// Every unknown metric is reported at once, sorted and deduplicated.
    pub fn parse(metrics: Option<&str>, edge_mode: Option<&str>) -> Result<Self, AnalysisError> {
        let mut parsed = BTreeSet::new();
        let mut invalid = BTreeSet::new();

        for token in metrics.unwrap_or_default().split(',') {
            let token = token.trim().to_lowercase();
            if token.is_empty() {
                continue;
            }
            match token.parse::<Metric>() {
                Ok(metric) => {
                    parsed.insert(metric);
                }
                Err(_) => {
                    invalid.insert(token);
                }
            }
        }

        if !invalid.is_empty() {
            return Err(AnalysisError::InvalidMetricRequest {
                invalid: invalid.into_iter().collect(),
                valid: Metric::valid_names(),
            });
        }

        let edge_mode = edge_mode.map(str::parse::<EdgeMode>).transpose()?;
        Ok(Self::new(parsed, edge_mode))
    }

    pub fn metrics(&self) -> &BTreeSet<Metric> {
        &self.metrics
    }

    pub fn edge_mode(&self) -> Option<EdgeMode> {
        self.edge_mode
    }

    pub fn wants(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }

    /// Stable serialization used as part of the cache key.
    pub fn canonical(&self) -> String {
        let metrics: Vec<&str> = self.metrics.iter().map(|m| m.as_str()).collect();
        format!(
            "{}|{}",
            metrics.join(","),
            self.edge_mode.map(EdgeMode::as_str).unwrap_or_default()
        )
    }
}

/// One luminance histogram bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Inclusive integer luminance range, e.g. "0-25"
    pub range: String,

    /// Share of pixels in this range, one decimal place
    pub percent: f64,
}

/// The analysis response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Brightness from 0 (black) to 100 (white)
    pub brightness_score: u8,

    /// Mean luminance, 0-255
    pub average_luminance: f64,

    // === Edge Analysis ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_brightness_score: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_average_luminance: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_mode: Option<EdgeMode>,

    // === Optional Metrics ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_luminance: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Vec<HistogramBucket>>,

    // === Metadata ===
    /// Original (pre-resize) width in pixels
    pub width: u32,

    /// Original (pre-resize) height in pixels
    pub height: u32,

    /// Luminance formula identifier
    pub algorithm: String,

    /// Wall time spent in the pipeline
    pub processing_time_ms: f64,

    /// Whether this result was served from the result cache
    pub cached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_brightness_only() {
        let options = AnalysisOptions::parse(None, None).unwrap();
        assert_eq!(options.metrics().len(), 1);
        assert!(options.wants(Metric::Brightness));
        assert_eq!(options.edge_mode(), None);
    }

    #[test]
    fn test_parse_normalizes_tokens() {
        let options = AnalysisOptions::parse(Some(" Median, ,HISTOGRAM,"), Some(" ALL ")).unwrap();
        assert!(options.wants(Metric::Brightness));
        assert!(options.wants(Metric::Median));
        assert!(options.wants(Metric::Histogram));
        assert_eq!(options.edge_mode(), Some(EdgeMode::All));
    }

    #[test]
    fn test_parse_unknown_metric() {
        let err = AnalysisOptions::parse(Some("brightness,sharpness"), None).unwrap_err();
        match err {
            AnalysisError::InvalidMetricRequest { invalid, valid } => {
                assert_eq!(invalid, vec!["sharpness".to_string()]);
                assert_eq!(valid, vec!["brightness", "median", "histogram"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_reports_all_unknown_metrics_once() {
        let err = AnalysisOptions::parse(Some("zeta,alpha,zeta"), None).unwrap_err();
        match err {
            AnalysisError::InvalidMetricRequest { invalid, .. } => {
                assert_eq!(invalid, vec!["alpha".to_string(), "zeta".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_unknown_edge_mode() {
        let err = AnalysisOptions::parse(None, Some("diagonal")).unwrap_err();
        match err {
            AnalysisError::InvalidEdgeMode { received, valid } => {
                assert_eq!(received, "diagonal");
                assert_eq!(valid, vec!["left_right", "top_bottom", "all"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_canonical_is_order_independent() {
        let a = AnalysisOptions::parse(Some("histogram,median"), Some("top_bottom")).unwrap();
        let b = AnalysisOptions::parse(Some("median,histogram,brightness"), Some("top_bottom"))
            .unwrap();
        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(a.canonical(), "brightness,median,histogram|top_bottom");
        assert_eq!(AnalysisOptions::default().canonical(), "brightness|");
    }

    #[test]
    fn test_result_omits_unrequested_fields() {
        let result = AnalysisResult {
            brightness_score: 50,
            average_luminance: 128.0,
            edge_brightness_score: None,
            edge_average_luminance: None,
            edge_mode: None,
            median_luminance: None,
            histogram: None,
            width: 10,
            height: 10,
            algorithm: ALGORITHM.to_string(),
            processing_time_ms: 1.5,
            cached: false,
        };
        let json = serde_json::to_value(&result).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("median_luminance"));
        assert!(!object.contains_key("histogram"));
        assert!(!object.contains_key("edge_mode"));
        assert_eq!(json["algorithm"], "rec709");
        assert_eq!(json["cached"], false);
    }

    #[test]
    fn test_edge_mode_serializes_snake_case() {
        let json = serde_json::to_string(&EdgeMode::LeftRight).unwrap();
        assert_eq!(json, "\"left_right\"");
    }
}

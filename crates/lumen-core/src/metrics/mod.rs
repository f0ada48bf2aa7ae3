//! Aggregators over a luminance array.
//!
//! - **brightness**: average, score and median
//! - **histogram**: ten-bucket distribution
//! - **edge**: border-strip averages
//!
//! Each aggregator reads the shared [`LuminanceArray`] and produces an
//! unrounded value; rounding for output happens once in [`Measurements`] via
//! [`round2`].

pub mod brightness;
pub mod edge;
pub mod histogram;

pub use edge::EdgeRegion;

use crate::pipeline::LuminanceArray;
use crate::types::{AnalysisOptions, EdgeMode, HistogramBucket, Metric};

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Edge metrics for one mode.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMeasurement {
    pub mode: EdgeMode,
    pub score: u8,
    pub average: f64,
}

/// Everything the aggregators computed for one analysis.
///
/// Averages are rounded to two decimals; scores are derived from the
/// unrounded averages.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurements {
    pub score: u8,
    pub average: f64,
    pub median: Option<f64>,
    pub histogram: Option<Vec<HistogramBucket>>,
    pub edge: Option<EdgeMeasurement>,
}

impl Measurements {
    /// Run the aggregators requested by `options` over `luminance`.
    pub fn compute(luminance: &LuminanceArray, options: &AnalysisOptions) -> Self {
        let average = brightness::average(luminance.values());

        let median = options
            .wants(Metric::Median)
            .then(|| round2(brightness::median(luminance.values())));

        let histogram = options
            .wants(Metric::Histogram)
            .then(|| histogram::histogram(luminance));

        let edge = options.edge_mode().map(|mode| {
            let edge_avg = edge::edge_average(luminance, mode);
            EdgeMeasurement {
                mode,
                score: brightness::score(edge_avg),
                average: round2(edge_avg),
            }
        });

        Self {
            score: brightness::score(average),
            average: round2(average),
            median,
            histogram,
            edge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PixelBuffer;
    use image::{Rgb, RgbImage};

    fn lum(img: RgbImage) -> LuminanceArray {
        LuminanceArray::from_pixels(&PixelBuffer::new(img).unwrap())
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(127.999_999_999_9), 128.0);
        assert_eq!(round2(186.344), 186.34);
        assert_eq!(round2(186.346), 186.35);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_brightness_only() {
        let m = Measurements::compute(
            &lum(RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]))),
            &AnalysisOptions::default(),
        );
        assert_eq!(m.score, 100);
        assert_eq!(m.average, 255.0);
        assert!(m.median.is_none());
        assert!(m.histogram.is_none());
        assert!(m.edge.is_none());
    }

    #[test]
    fn test_all_requested() {
        let options = AnalysisOptions::new(Metric::ALL, Some(EdgeMode::LeftRight));
        let m = Measurements::compute(&lum(RgbImage::new(20, 10)), &options);
        assert_eq!(m.score, 0);
        assert_eq!(m.median, Some(0.0));
        assert_eq!(m.histogram.as_ref().map(Vec::len), Some(10));
        let edge = m.edge.unwrap();
        assert_eq!(edge.mode, EdgeMode::LeftRight);
        assert_eq!(edge.score, 0);
        assert_eq!(edge.average, 0.0);
    }

    #[test]
    fn test_score_uses_unrounded_average() {
        // Mid gray sits a hair off 128.0 in floating point.
        let m = Measurements::compute(
            &lum(RgbImage::from_pixel(4, 4, Rgb([128, 128, 128]))),
            &AnalysisOptions::default(),
        );
        assert_eq!(m.score, 50);
        assert_eq!(m.average, 128.0);
    }
}

//! Ten-bucket luminance distribution.
//!
//! Bucket boundaries follow the published integer labels exactly. A real
//! sample `v` belongs to bucket `i` when `lower[i] <= v < lower[i + 1]`; the
//! last bucket is closed at 255. Samples within `BOUNDARY_TOLERANCE` below a
//! lower bound count as reaching it, so a pure gray of value `g` always lands
//! in the bucket whose label contains `g`.

use crate::pipeline::LuminanceArray;
use crate::types::HistogramBucket;

/// Number of buckets.
pub const BUCKET_COUNT: usize = 10;

/// Inclusive integer label bounds for each bucket.
pub const BUCKET_RANGES: [(u8, u8); BUCKET_COUNT] = [
    (0, 25),
    (26, 51),
    (52, 76),
    (77, 102),
    (103, 127),
    (128, 153),
    (154, 178),
    (179, 204),
    (205, 229),
    (230, 255),
];

/// Shares are distributed in tenths of a percent.
const TENTHS_TOTAL: u64 = 1000;

/// Rec. 709 weights sum to 1.0 only up to rounding, so `luminance([230; 3])`
/// is 229.99999999999997.
const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// Index of the bucket a luminance sample falls into.
pub fn bucket_index(value: f64) -> usize {
    let value = value + BOUNDARY_TOLERANCE;
    BUCKET_RANGES
        .partition_point(|&(lower, _)| f64::from(lower) <= value)
        .saturating_sub(1)
}

/// Compute the luminance histogram.
///
/// Each percentage is one of the two one-decimal values adjacent to the exact
/// share; remaining tenths go to the buckets with the largest remainders so
/// that the total is exactly 100.0.
pub fn histogram(luminance: &LuminanceArray) -> Vec<HistogramBucket> {
    let mut counts = [0u64; BUCKET_COUNT];
    for &value in luminance.values() {
        counts[bucket_index(value)] += 1;
    }
    let tenths = distribute_tenths(&counts);

    BUCKET_RANGES
        .iter()
        .zip(tenths)
        .map(|(&(lower, upper), t)| HistogramBucket {
            range: format!("{lower}-{upper}"),
            percent: t as f64 / 10.0,
        })
        .collect()
}

/// Largest-remainder apportionment of 1000 tenths over the bucket counts.
fn distribute_tenths(counts: &[u64; BUCKET_COUNT]) -> [u64; BUCKET_COUNT] {
    let total: u64 = counts.iter().sum();
    let mut tenths = [0u64; BUCKET_COUNT];
    if total == 0 {
        return tenths;
    }

    let mut remainders = [(0u64, 0usize); BUCKET_COUNT];
    for (i, &count) in counts.iter().enumerate() {
        let scaled = count * TENTHS_TOTAL;
        tenths[i] = scaled / total;
        remainders[i] = (scaled % total, i);
    }

    let assigned: u64 = tenths.iter().sum();
    let leftover = (TENTHS_TOTAL - assigned) as usize;

    // Largest remainder first, lower bucket first on ties.
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, i) in remainders.iter().take(leftover) {
        tenths[i] += 1;
    }
    tenths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::luminance::luminance;
    use crate::pipeline::PixelBuffer;
    use image::{Rgb, RgbImage};

    fn lum(img: RgbImage) -> LuminanceArray {
        LuminanceArray::from_pixels(&PixelBuffer::new(img).unwrap())
    }

    fn total(buckets: &[HistogramBucket]) -> f64 {
        buckets.iter().map(|b| b.percent).sum()
    }

    #[test]
    fn test_canonical_labels() {
        let buckets = histogram(&lum(RgbImage::new(2, 2)));
        let labels: Vec<&str> = buckets.iter().map(|b| b.range.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "0-25", "26-51", "52-76", "77-102", "103-127", "128-153", "154-178", "179-204",
                "205-229", "230-255"
            ]
        );
    }

    #[test]
    fn test_ranges_contiguous_and_cover_full_scale() {
        assert_eq!(BUCKET_RANGES[0].0, 0);
        assert_eq!(BUCKET_RANGES[BUCKET_COUNT - 1].1, 255);
        for pair in BUCKET_RANGES.windows(2) {
            assert_eq!(u16::from(pair[0].1) + 1, u16::from(pair[1].0));
        }
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(bucket_index(0.0), 0);
        assert_eq!(bucket_index(25.0), 0);
        assert_eq!(bucket_index(25.99), 0);
        assert_eq!(bucket_index(26.0), 1);
        assert_eq!(bucket_index(127.9), 4);
        assert_eq!(bucket_index(128.0), 5);
        assert_eq!(bucket_index(229.99), 8);
        assert_eq!(bucket_index(255.0), 9);
        assert_eq!(bucket_index(255.000_000_1), 9);
    }

    #[test]
    fn test_every_gray_level_lands_in_its_labelled_bucket() {
        for g in 0..=255u8 {
            let (lower, upper) = BUCKET_RANGES[bucket_index(luminance([g, g, g]))];
            assert!((lower..=upper).contains(&g), "gray {g} bucketed as {lower}-{upper}");
        }
    }

    #[test]
    fn test_solid_boundary_grays() {
        for (g, expected) in [(26u8, 1usize), (52, 2), (179, 7), (205, 8), (230, 9), (255, 9)] {
            let buckets = histogram(&lum(RgbImage::from_pixel(2, 2, Rgb([g, g, g]))));
            assert_eq!(buckets[expected].percent, 100.0, "gray {g}");
        }
    }

    #[test]
    fn test_concentrated_in_one_bucket() {
        let buckets = histogram(&lum(RgbImage::from_pixel(7, 3, Rgb([140, 140, 140]))));
        assert_eq!(buckets[5].percent, 100.0);
        assert_eq!(total(&buckets), 100.0);
    }

    #[test]
    fn test_thirds_sum_to_exactly_100() {
        // Three equally sized groups: 33.3 + 33.3 + 33.4
        let img = RgbImage::from_fn(3, 1, |x, _| match x {
            0 => Rgb([0, 0, 0]),
            1 => Rgb([140, 140, 140]),
            _ => Rgb([255, 255, 255]),
        });
        let buckets = histogram(&lum(img));
        assert!((total(&buckets) - 100.0).abs() < 1e-9);
        assert_eq!(buckets[0].percent, 33.4);
        assert_eq!(buckets[5].percent, 33.3);
        assert_eq!(buckets[9].percent, 33.3);
    }

    #[test]
    fn test_gradient_sums_to_100() {
        let img = RgbImage::from_fn(256, 7, |x, y| {
            let v = ((x * 7 + y * 13) % 256) as u8;
            Rgb([v, v, v])
        });
        let buckets = histogram(&lum(img));
        assert!((total(&buckets) - 100.0).abs() <= 0.1);
        for bucket in &buckets {
            assert!(bucket.percent >= 5.0 && bucket.percent <= 15.0);
        }
    }

    #[test]
    fn test_each_share_within_a_tenth() {
        let counts = [1, 1, 1, 1, 1, 1, 1, 0, 0, 0];
        let tenths = distribute_tenths(&counts);
        assert_eq!(tenths.iter().sum::<u64>(), 1000);
        for (i, &t) in tenths.iter().enumerate() {
            let exact = counts[i] as f64 * 1000.0 / 7.0;
            assert!((t as f64 - exact).abs() < 1.0);
        }
        assert_eq!(&tenths[7..], &[0, 0, 0]);
    }
}

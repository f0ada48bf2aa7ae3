//! Scalar brightness statistics: mean, score and median.

/// Arithmetic mean of the samples; `0.0` for an empty slice.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Map an average luminance in `[0, 255]` to a score in `[0, 100]`.
///
/// Rounds half up (e.g. 50.5 -> 51), which for the non-negative values seen
/// here is what `f64::round` does.
pub fn score(average_luminance: f64) -> u8 {
    let normalized = average_luminance / 255.0 * 100.0;
    normalized.round().clamp(0.0, 100.0) as u8
}

/// Exact median: the middle sample for odd counts, the mean of the two middle
/// samples for even counts. `0.0` for an empty slice.
///
/// Uses selection on a scratch copy rather than a full sort.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut scratch = values.to_vec();
    let mid = scratch.len() / 2;
    let (lower, upper, _) = scratch.select_nth_unstable_by(mid, f64::total_cmp);
    let upper = *upper;

    if values.len() % 2 == 1 {
        return upper;
    }

    // Every element left of `mid` is <= upper; the largest of them is the
    // other middle sample.
    let lower = lower.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (lower + upper) / 2.0
}

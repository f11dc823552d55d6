use crate::core::interval::Interval;
use crate::core::time::TimeKind;

/// Width of every bucket in x-axis units, from consecutive boundaries.
///
/// `boundaries` holds one more entry than there are buckets; the last entry is
/// the projected end of the final bucket. Date-time axes are measured in
/// seconds, every other kind in days.
#[must_use]
pub fn bucket_widths(kind: TimeKind, boundaries: &[i64]) -> Vec<f64> {
    boundaries
        .windows(2)
        .map(|pair| kind.ordinal_to_axis((pair[1] - pair[0]) as f64))
        .collect()
}

/// Widths for a fixed-day interval; `None` for calendar units of variable length.
#[must_use]
pub fn fixed_widths(interval: Interval, kind: TimeKind, bucket_count: usize) -> Option<Vec<f64>> {
    let days = interval.fixed_days()?;
    Some(vec![kind.ordinal_to_axis(days as f64); bucket_count])
}

/// Bar center that puts the bar's left edge on the bucket start.
#[must_use]
pub fn left_aligned_center(start: f64, width: f64) -> f64 {
    start + width * 0.5
}

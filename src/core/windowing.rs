use std::ops::Range;

/// Inclusive day-ordinal window; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayWindow {
    pub first: Option<i64>,
    pub last: Option<i64>,
}

impl DayWindow {
    #[must_use]
    pub fn new(first: Option<i64>, last: Option<i64>) -> Self {
        Self { first, last }
    }

    #[must_use]
    pub fn contains(self, ordinal: i64) -> bool {
        self.first.is_none_or(|first| ordinal >= first)
            && self.last.is_none_or(|last| ordinal <= last)
    }
}

/// Index range of sorted bucket starts falling inside an inclusive window.
#[must_use]
pub fn starts_in_window(starts: &[i64], start: i64, end: i64) -> Range<usize> {
    let (min_t, max_t) = if start <= end {
        (start, end)
    } else {
        (end, start)
    };

    let lower = starts.partition_point(|&value| value < min_t);
    let upper = starts.partition_point(|&value| value <= max_t);
    lower..upper.max(lower)
}

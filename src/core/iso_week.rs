//! ISO-8601 week labels and thinned axis breaks for weekly incidence.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::time::TimePoint;

/// Formats `date` as `YYYY-Www` using the ISO week-numbering year.
#[must_use]
pub fn iso_week_label(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{:04}-W{:02}", week.year(), week.week())
}

/// Paired axis break positions and labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsoWeekBreaks {
    pub positions: Vec<TimePoint>,
    pub labels: Vec<String>,
}

/// Picks every `ceil(len / n_breaks)`-th bucket start, beginning with the first.
///
/// Numeric bucket starts carry no calendar and are skipped.
#[must_use]
pub fn iso_week_breaks(dates: &[TimePoint], n_breaks: usize) -> IsoWeekBreaks {
    let stride = dates.len().div_ceil(n_breaks.max(1)).max(1);
    let (positions, labels) = dates
        .iter()
        .step_by(stride)
        .filter_map(|point| Some((*point, iso_week_label(point.calendar_date()?))))
        .unzip();
    IsoWeekBreaks { positions, labels }
}

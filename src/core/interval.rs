use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::time::{TimeKind, date_to_ordinal, ordinal_to_date};
use crate::error::{IncidenceError, IncidenceResult};

/// Symbolic binning units accepted by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarUnit {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl CalendarUnit {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    /// Month count of one unit, `None` for units with a fixed day length.
    #[must_use]
    pub fn months(self) -> Option<u32> {
        match self {
            Self::Month => Some(1),
            Self::Quarter => Some(3),
            Self::Year => Some(12),
            Self::Day | Self::Week => None,
        }
    }
}

/// Resolved binning interval: a fixed day count or a calendar unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    Days(u32),
    Unit(CalendarUnit),
}

impl Interval {
    /// Day length shared by every bucket, when the interval has one.
    #[must_use]
    pub fn fixed_days(self) -> Option<i64> {
        match self {
            Self::Days(days) => Some(i64::from(days)),
            Self::Unit(CalendarUnit::Day) => Some(1),
            Self::Unit(CalendarUnit::Week) => Some(7),
            Self::Unit(_) => None,
        }
    }

    /// Month count of one bucket for calendar-month units.
    #[must_use]
    pub fn months(self) -> Option<u32> {
        match self {
            Self::Unit(unit) => unit.months(),
            Self::Days(_) => None,
        }
    }

    #[must_use]
    pub fn is_calendar_unit(self) -> bool {
        matches!(self, Self::Unit(_))
    }

    #[must_use]
    pub fn is_weekly(self) -> bool {
        self.fixed_days() == Some(7)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(days) => write!(f, "{days}"),
            Self::Unit(unit) => f.write_str(unit.name()),
        }
    }
}

impl FromStr for Interval {
    type Err = IncidenceError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let folded = input.trim().to_lowercase();
        if !folded.is_empty() && folded.bytes().all(|b| b.is_ascii_digit()) {
            let days: i64 = folded.parse().map_err(|_| {
                IncidenceError::InvalidInterval(format!("`{input}` is too large"))
            })?;
            return days_interval(days);
        }

        let singular = folded.strip_suffix('s').unwrap_or(&folded);
        let unit = match singular {
            "day" => CalendarUnit::Day,
            "week" => CalendarUnit::Week,
            "month" => CalendarUnit::Month,
            "quarter" => CalendarUnit::Quarter,
            "year" => CalendarUnit::Year,
            _ => {
                return Err(IncidenceError::InvalidInterval(format!(
                    "`{input}` is not one of day, week, month, quarter, year or a day count"
                )));
            }
        };
        Ok(Self::Unit(unit))
    }
}

fn days_interval(days: i64) -> IncidenceResult<Interval> {
    if days <= 0 {
        return Err(IncidenceError::InvalidInterval(format!(
            "day count must be > 0, got {days}"
        )));
    }
    u32::try_from(days)
        .map(Interval::Days)
        .map_err(|_| IncidenceError::InvalidInterval(format!("day count {days} is too large")))
}

/// Interval as supplied by callers and config files: `7` or `"weeks"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntervalSpec {
    Days(i64),
    Named(String),
}

impl Default for IntervalSpec {
    fn default() -> Self {
        Self::Days(1)
    }
}

impl From<i64> for IntervalSpec {
    fn from(days: i64) -> Self {
        Self::Days(days)
    }
}

impl From<i32> for IntervalSpec {
    fn from(days: i32) -> Self {
        Self::Days(i64::from(days))
    }
}

impl From<&str> for IntervalSpec {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl From<CalendarUnit> for IntervalSpec {
    fn from(unit: CalendarUnit) -> Self {
        Self::Named(unit.name().to_owned())
    }
}

impl IntervalSpec {
    /// Normalizes the caller value into a new `Interval`; `self` is left untouched.
    pub fn resolve(&self) -> IncidenceResult<Interval> {
        match self {
            Self::Days(days) => days_interval(*days),
            Self::Named(name) => name.parse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Step {
    Days(i64),
    Months(u32),
}

/// Concrete bucket layout: origin plus a fixed or calendar step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinningRule {
    interval: Interval,
    kind: TimeKind,
    origin: i64,
    step: Step,
    iso_weeks: bool,
}

/// Builds the binning rule for `interval` starting from `anchor`.
///
/// `anchor` is a day ordinal: the explicit first date when supplied, otherwise
/// the earliest retained observation. With `standard` alignment on calendar
/// input the origin snaps back to the start of the unit containing `anchor`.
pub fn resolve_binning(
    interval: Interval,
    kind: TimeKind,
    standard: bool,
    anchor: i64,
) -> IncidenceResult<BinningRule> {
    let step = match (interval.fixed_days(), interval.months()) {
        (Some(days), _) => Step::Days(days),
        (None, Some(months)) if kind.is_calendar() => Step::Months(months),
        _ => {
            return Err(IncidenceError::InvalidInterval(format!(
                "`{interval}` intervals need calendar dates, not numeric values"
            )));
        }
    };

    let aligned =
        standard && kind.is_calendar() && (interval.is_calendar_unit() || interval.is_weekly());
    let origin = if aligned {
        align_to_unit_start(interval, anchor)?
    } else {
        anchor
    };
    let iso_weeks = aligned && interval.is_weekly();

    trace!(%interval, ?kind, standard, anchor, origin, iso_weeks, "resolved binning rule");
    Ok(BinningRule {
        interval,
        kind,
        origin,
        step,
        iso_weeks,
    })
}

fn align_to_unit_start(interval: Interval, anchor: i64) -> IncidenceResult<i64> {
    let date = ordinal_to_date(anchor)?;
    if interval.is_weekly() {
        return Ok(anchor - i64::from(date.weekday().num_days_from_monday()));
    }
    let start = match interval {
        Interval::Unit(CalendarUnit::Month) => date.with_day(1),
        Interval::Unit(CalendarUnit::Quarter) => {
            let first_month = (date.month0() / 3) * 3 + 1;
            date.with_day(1).and_then(|d| d.with_month(first_month))
        }
        Interval::Unit(CalendarUnit::Year) => date.with_day(1).and_then(|d| d.with_month(1)),
        Interval::Unit(CalendarUnit::Day | CalendarUnit::Week) | Interval::Days(_) => Some(date),
    };
    start.map(date_to_ordinal).ok_or_else(|| {
        IncidenceError::InvalidData(format!("cannot align {date} to a {interval} boundary"))
    })
}

impl BinningRule {
    #[must_use]
    pub fn interval(&self) -> Interval {
        self.interval
    }

    #[must_use]
    pub fn kind(&self) -> TimeKind {
        self.kind
    }

    #[must_use]
    pub fn origin(&self) -> i64 {
        self.origin
    }

    /// Whether bucket starts are Mondays of ISO weeks.
    #[must_use]
    pub fn iso_weeks(&self) -> bool {
        self.iso_weeks
    }

    /// Start of bucket `index`, counted from the origin.
    ///
    /// Calendar steps are computed from the origin rather than chained so a
    /// month-end origin keeps its day-of-month wherever the month allows it.
    pub fn boundary(&self, index: usize) -> IncidenceResult<i64> {
        match self.step {
            Step::Days(days) => i64::try_from(index)
                .ok()
                .and_then(|i| i.checked_mul(days))
                .and_then(|offset| self.origin.checked_add(offset))
                .ok_or_else(|| {
                    IncidenceError::InvalidData(format!("bucket {index} overflows the time range"))
                }),
            Step::Months(months) => {
                let origin = ordinal_to_date(self.origin)?;
                u32::try_from(index)
                    .ok()
                    .and_then(|i| i.checked_mul(months))
                    .and_then(|total| origin.checked_add_months(Months::new(total)))
                    .map(date_to_ordinal)
                    .ok_or_else(|| {
                        IncidenceError::InvalidData(format!(
                            "bucket {index} overflows the calendar range"
                        ))
                    })
            }
        }
    }

    /// Bucket starts from the origin through the bucket containing `last`,
    /// followed by one projected boundary closing the final bucket.
    pub fn boundaries_covering(&self, last: i64) -> IncidenceResult<Vec<i64>> {
        let mut boundaries = Vec::new();
        let mut index = 0;
        loop {
            let boundary = self.boundary(index)?;
            boundaries.push(boundary);
            if boundary > last && index > 0 {
                break;
            }
            index += 1;
        }
        Ok(boundaries)
    }

    /// Index of the half-open bucket `[b[i], b[i+1])` containing `ordinal`.
    #[must_use]
    pub fn locate(&self, boundaries: &[i64], ordinal: i64) -> Option<usize> {
        let bucket_count = boundaries.len().checked_sub(1)?;
        if ordinal < *boundaries.first()? || ordinal >= *boundaries.last()? {
            return None;
        }
        let index = match self.step {
            Step::Days(days) => usize::try_from((ordinal - boundaries[0]).div_euclid(days)).ok()?,
            Step::Months(_) => boundaries.partition_point(|&start| start <= ordinal) - 1,
        };
        (index < bucket_count).then_some(index)
    }
}

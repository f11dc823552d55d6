use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{IncidenceError, IncidenceResult};

pub const SECONDS_PER_DAY: i64 = 86_400;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Which flavour of time values a call operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeKind {
    Numeric,
    CalendarDate,
    DateTime,
}

impl TimeKind {
    /// Axis units covered by one day: seconds for date-time axes, days otherwise.
    #[must_use]
    pub fn axis_units_per_day(self) -> f64 {
        match self {
            Self::DateTime => SECONDS_PER_DAY as f64,
            Self::Numeric | Self::CalendarDate => 1.0,
        }
    }

    #[must_use]
    pub fn is_calendar(self) -> bool {
        !matches!(self, Self::Numeric)
    }

    /// Maps a (possibly fractional) day ordinal onto this kind's axis.
    #[must_use]
    pub fn ordinal_to_axis(self, ordinal: f64) -> f64 {
        ordinal * self.axis_units_per_day()
    }
}

/// A single bucket start or bound, tagged by its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimePoint {
    Numeric(i64),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl TimePoint {
    #[must_use]
    pub fn kind(self) -> TimeKind {
        match self {
            Self::Numeric(_) => TimeKind::Numeric,
            Self::Date(_) => TimeKind::CalendarDate,
            Self::DateTime(_) => TimeKind::DateTime,
        }
    }

    /// Whole-day ordinal used for binning. Date-times are floored to their UTC day.
    #[must_use]
    pub fn day_ordinal(self) -> i64 {
        match self {
            Self::Numeric(value) => value,
            Self::Date(date) => date_to_ordinal(date),
            Self::DateTime(time) => time.timestamp().div_euclid(SECONDS_PER_DAY),
        }
    }

    pub fn from_ordinal(kind: TimeKind, ordinal: i64) -> IncidenceResult<Self> {
        match kind {
            TimeKind::Numeric => Ok(Self::Numeric(ordinal)),
            TimeKind::CalendarDate => ordinal_to_date(ordinal).map(Self::Date),
            TimeKind::DateTime => ordinal
                .checked_mul(SECONDS_PER_DAY)
                .and_then(|seconds| DateTime::<Utc>::from_timestamp(seconds, 0))
                .map(Self::DateTime)
                .ok_or_else(|| {
                    IncidenceError::InvalidData(format!(
                        "day ordinal {ordinal} cannot be represented as a date-time"
                    ))
                }),
        }
    }

    /// Position on the x-axis: raw value, days since the Unix epoch, or Unix seconds.
    #[must_use]
    pub fn axis_value(self) -> f64 {
        match self {
            Self::Numeric(value) => value as f64,
            Self::Date(date) => date_to_ordinal(date) as f64,
            Self::DateTime(time) => time.timestamp_millis() as f64 / 1000.0,
        }
    }

    #[must_use]
    pub fn calendar_date(self) -> Option<NaiveDate> {
        match self {
            Self::Numeric(_) => None,
            Self::Date(date) => Some(date),
            Self::DateTime(time) => Some(time.date_naive()),
        }
    }
}

#[must_use]
pub fn date_to_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE
}

pub fn ordinal_to_date(ordinal: i64) -> IncidenceResult<NaiveDate> {
    ordinal
        .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(|days| i32::try_from(days).ok())
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| {
            IncidenceError::InvalidData(format!(
                "day ordinal {ordinal} is outside the supported calendar range"
            ))
        })
}

/// Uniformly typed event sequence; `None` marks a missing observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventDates {
    Numeric(Vec<Option<f64>>),
    CalendarDate(Vec<Option<NaiveDate>>),
    DateTime(Vec<Option<DateTime<Utc>>>),
}

impl EventDates {
    pub fn numeric(values: impl IntoIterator<Item = f64>) -> Self {
        Self::Numeric(values.into_iter().map(Some).collect())
    }

    pub fn integers(values: impl IntoIterator<Item = i64>) -> Self {
        Self::Numeric(values.into_iter().map(|v| Some(v as f64)).collect())
    }

    pub fn dates(values: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self::CalendarDate(values.into_iter().map(Some).collect())
    }

    pub fn date_times(values: impl IntoIterator<Item = DateTime<Utc>>) -> Self {
        Self::DateTime(values.into_iter().map(Some).collect())
    }

    #[must_use]
    pub fn kind(&self) -> TimeKind {
        match self {
            Self::Numeric(_) => TimeKind::Numeric,
            Self::CalendarDate(_) => TimeKind::CalendarDate,
            Self::DateTime(_) => TimeKind::DateTime,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::CalendarDate(values) => values.len(),
            Self::DateTime(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

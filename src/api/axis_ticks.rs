use crate::core::time::ordinal_to_date;
use crate::core::{CalendarUnit, IncidenceTable, Interval, TimeKind, TimePoint, iso_week_breaks};
use crate::error::IncidenceResult;
use crate::render::{AxisBreak, CalendarStep, StepUnit};

const MAX_BREAKS: usize = 1_000;

/// Smallest 1-2-5 multiple of a power of ten that is >= `raw_step`.
pub(super) fn nice_step(raw_step: f64) -> f64 {
    let abs_step = raw_step.abs();
    if !abs_step.is_finite() || abs_step == 0.0 {
        return 1.0;
    }

    let mut candidate = 1.0;
    while candidate * 10.0 < abs_step {
        candidate *= 10.0;
    }
    while candidate > abs_step {
        candidate /= 10.0;
    }

    [candidate, candidate * 2.0, candidate * 5.0, candidate * 10.0]
        .into_iter()
        .find(|step| *step >= abs_step)
        .unwrap_or(candidate * 10.0)
}

/// Evenly spaced "pretty" values covering `[min, max]`, never finer than `min_step`.
pub(super) fn pretty_breaks(min: f64, max: f64, target: usize, min_step: f64) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if max <= min {
        return vec![min];
    }

    let raw = (max - min) / target.max(1) as f64;
    let step = nice_step(raw).max(min_step);
    let first = (min / step).ceil() * step;

    let mut breaks = Vec::new();
    let mut index = 0.0;
    loop {
        let value = first + index * step;
        if value > max + step * 1e-9 || breaks.len() >= MAX_BREAKS {
            break;
        }
        breaks.push(value);
        index += 1.0;
    }
    breaks
}

/// x-axis breaks: ISO week labels when available, otherwise pretty day breaks.
pub(super) fn x_axis_breaks(
    table: &IncidenceTable,
    n_breaks: usize,
    use_iso_weeks: bool,
) -> IncidenceResult<Vec<AxisBreak>> {
    if use_iso_weeks && table.isoweeks().is_some() {
        let iso = iso_week_breaks(table.dates(), n_breaks);
        return Ok(iso
            .positions
            .iter()
            .zip(iso.labels)
            .map(|(point, label)| AxisBreak {
                position: point.axis_value(),
                label,
            })
            .collect());
    }

    let boundaries = table.boundaries();
    let first = boundaries.first().copied().unwrap_or_default() as f64;
    let last = boundaries.last().copied().unwrap_or_default() as f64;
    let kind = table.kind();
    pretty_breaks(first, last, n_breaks, 1.0)
        .into_iter()
        .map(|day| {
            let ordinal = day.round() as i64;
            Ok(AxisBreak {
                position: kind.ordinal_to_axis(ordinal as f64),
                label: format_day_label(kind, ordinal)?,
            })
        })
        .collect()
}

fn format_day_label(kind: TimeKind, ordinal: i64) -> IncidenceResult<String> {
    match TimePoint::from_ordinal(kind, ordinal)? {
        TimePoint::Numeric(value) => Ok(value.to_string()),
        TimePoint::Date(_) | TimePoint::DateTime(_) => {
            Ok(ordinal_to_date(ordinal)?.format("%Y-%m-%d").to_string())
        }
    }
}

/// Approximate calendar cadence for symbolic intervals.
///
/// `ceil(timespan / (n_breaks * mean_width))` units, at least one; quarters are
/// expressed as three-month steps.
pub(super) fn calendar_step(table: &IncidenceTable, n_breaks: usize) -> Option<CalendarStep> {
    let Interval::Unit(unit) = table.interval() else {
        return None;
    };

    let boundaries = table.boundaries();
    let bucket_count = boundaries.len().checked_sub(1).filter(|count| *count > 0)?;
    let total_days = (boundaries[bucket_count] - boundaries[0]) as f64;
    let mean_width = total_days / bucket_count as f64;
    let raw = table.timespan() as f64 / (n_breaks.max(1) as f64 * mean_width);
    let units = (raw.ceil() as u32).max(1);

    let (count, unit) = match unit {
        CalendarUnit::Day => (units, StepUnit::Day),
        CalendarUnit::Week => (units, StepUnit::Week),
        CalendarUnit::Month => (units, StepUnit::Month),
        CalendarUnit::Quarter => (units.saturating_mul(3), StepUnit::Month),
        CalendarUnit::Year => (units, StepUnit::Year),
    };
    Some(CalendarStep { count, unit })
}

use crate::core::{CalendarUnit, Interval, TimeKind};

/// y-axis title derived from the interval, e.g. "Weekly incidence".
///
/// Only an interval of exactly 14 days is called biweekly; other day counts
/// get the generic "Incidence by period of N days".
#[must_use]
pub fn default_y_title(interval: Interval, cumulative: bool) -> String {
    let base = match interval {
        Interval::Days(1) | Interval::Unit(CalendarUnit::Day) => "Daily incidence".to_owned(),
        Interval::Days(7) | Interval::Unit(CalendarUnit::Week) => "Weekly incidence".to_owned(),
        Interval::Days(14) => "Biweekly incidence".to_owned(),
        Interval::Days(days) => format!("Incidence by period of {days} days"),
        Interval::Unit(CalendarUnit::Month) => "Monthly incidence".to_owned(),
        Interval::Unit(CalendarUnit::Quarter) => "Quarterly incidence".to_owned(),
        Interval::Unit(CalendarUnit::Year) => "Yearly incidence".to_owned(),
    };

    if !cumulative {
        return base;
    }
    let mut chars = base.chars();
    let lowered: String = chars
        .next()
        .map(|first| first.to_lowercase().chain(chars).collect())
        .unwrap_or_default();
    format!("Cumulative {lowered}")
}

#[must_use]
pub fn default_x_title(kind: TimeKind) -> String {
    match kind {
        TimeKind::Numeric => "Time".to_owned(),
        TimeKind::CalendarDate | TimeKind::DateTime => "Date".to_owned(),
    }
}

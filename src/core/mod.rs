pub mod incidence;
pub mod interval;
pub mod iso_week;
pub mod table_ops;
pub mod time;
pub mod widths;
pub mod windowing;

pub use incidence::{
    Aggregation, AggregationConfig, IncidenceAggregator, IncidenceTable, MISSING_GROUP_LABEL,
};
pub use interval::{BinningRule, CalendarUnit, Interval, IntervalSpec, resolve_binning};
pub use iso_week::{IsoWeekBreaks, iso_week_breaks, iso_week_label};
pub use table_ops::{BucketPosition, LongRow};
pub use time::{EventDates, SECONDS_PER_DAY, TimeKind, TimePoint};
pub use widths::{bucket_widths, fixed_widths, left_aligned_center};
pub use windowing::DayWindow;

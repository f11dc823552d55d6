use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::interval::{Interval, IntervalSpec, resolve_binning};
use crate::core::iso_week::iso_week_label;
use crate::core::time::{EventDates, TimeKind, TimePoint};
use crate::core::widths::bucket_widths;
use crate::core::windowing::DayWindow;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{IncidenceError, IncidenceResult};

/// Column label used for observations without a group when they are kept.
///
/// When a real group already carries this label the missing column is
/// suffixed (`NA_1`, `NA_2`, ...) so the two never share a column.
pub const MISSING_GROUP_LABEL: &str = "NA";

/// Aggregation settings.
///
/// Serializable so hosts can keep binning setup next to their own config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub interval: IntervalSpec,
    pub standard: bool,
    pub na_as_group: bool,
    pub first_date: Option<TimePoint>,
    pub last_date: Option<TimePoint>,
    /// Explicit column order; unlisted labels follow in sorted order.
    pub group_levels: Option<Vec<String>>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            interval: IntervalSpec::default(),
            standard: true,
            na_as_group: true,
            first_date: None,
            last_date: None,
            group_levels: None,
        }
    }
}

impl AggregationConfig {
    #[must_use]
    pub fn with_interval(mut self, interval: impl Into<IntervalSpec>) -> Self {
        self.interval = interval.into();
        self
    }

    #[must_use]
    pub fn with_standard(mut self, standard: bool) -> Self {
        self.standard = standard;
        self
    }

    #[must_use]
    pub fn with_na_as_group(mut self, na_as_group: bool) -> Self {
        self.na_as_group = na_as_group;
        self
    }

    #[must_use]
    pub fn with_first_date(mut self, first_date: TimePoint) -> Self {
        self.first_date = Some(first_date);
        self
    }

    #[must_use]
    pub fn with_last_date(mut self, last_date: TimePoint) -> Self {
        self.last_date = Some(last_date);
        self
    }

    #[must_use]
    pub fn with_group_levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_levels = Some(levels.into_iter().map(Into::into).collect());
        self
    }

    /// Checks bounds against the input kind and returns the resolved interval.
    pub fn validate(&self, kind: TimeKind) -> IncidenceResult<Interval> {
        let interval = self.interval.resolve()?;
        for (name, bound) in [("first_date", self.first_date), ("last_date", self.last_date)] {
            let Some(bound) = bound else { continue };
            if bound.kind() != kind {
                return Err(IncidenceError::InvalidData(format!(
                    "{name} is {:?} but dates are {kind:?}",
                    bound.kind()
                )));
            }
        }
        let inverted = match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => first.day_ordinal() > last.day_ordinal(),
            _ => false,
        };
        if inverted {
            return Err(IncidenceError::InvalidData(
                "first_date must not be after last_date".to_owned(),
            ));
        }
        Ok(interval)
    }
}

/// Bucketed counts produced by one aggregation call.
///
/// Rows follow `dates`; columns follow `group_names` (a single unnamed column
/// when ungrouped). Transforms in `table_ops` return new tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidenceTable {
    pub(crate) dates: Vec<TimePoint>,
    pub(crate) counts: Vec<Vec<u64>>,
    pub(crate) group_names: Vec<String>,
    pub(crate) interval: Interval,
    pub(crate) kind: TimeKind,
    pub(crate) boundaries: Vec<i64>,
    pub(crate) timespan: i64,
    pub(crate) n: u64,
    pub(crate) isoweeks: Option<Vec<String>>,
    pub(crate) cumulative: bool,
}

pub(crate) struct TableParts {
    pub kind: TimeKind,
    pub interval: Interval,
    pub boundaries: Vec<i64>,
    pub counts: Vec<Vec<u64>>,
    pub group_names: Vec<String>,
    pub iso_weeks: bool,
    pub cumulative: bool,
}

impl IncidenceTable {
    pub(crate) fn from_parts(parts: TableParts) -> IncidenceResult<Self> {
        let bucket_count = parts.boundaries.len().saturating_sub(1);
        if bucket_count == 0 || parts.counts.len() != bucket_count {
            return Err(IncidenceError::InvalidData(format!(
                "{} count rows do not match {bucket_count} buckets",
                parts.counts.len()
            )));
        }

        let dates = parts.boundaries[..bucket_count]
            .iter()
            .map(|&start| TimePoint::from_ordinal(parts.kind, start))
            .collect::<IncidenceResult<Vec<_>>>()?;
        let isoweeks = parts.iso_weeks.then(|| {
            dates
                .iter()
                .filter_map(|date| date.calendar_date())
                .map(iso_week_label)
                .collect()
        });
        let timespan = parts.boundaries[bucket_count - 1] - parts.boundaries[0];
        let n = total_events(&parts.counts, parts.cumulative);

        Ok(Self {
            dates,
            counts: parts.counts,
            group_names: parts.group_names,
            interval: parts.interval,
            kind: parts.kind,
            boundaries: parts.boundaries,
            timespan,
            n,
            isoweeks,
            cumulative: parts.cumulative,
        })
    }

    pub(crate) fn parts_with(&self, boundaries: Vec<i64>, counts: Vec<Vec<u64>>) -> TableParts {
        TableParts {
            kind: self.kind,
            interval: self.interval,
            boundaries,
            counts,
            group_names: self.group_names.clone(),
            iso_weeks: self.isoweeks.is_some(),
            cumulative: self.cumulative,
        }
    }

    /// Checks the shape invariants of a table that did not come from
    /// `from_parts`, e.g. one read back from JSON.
    pub fn validate(&self) -> IncidenceResult<()> {
        let invalid = |reason: String| Err(IncidenceError::InvalidData(reason));
        let bucket_count = self.dates.len();
        if bucket_count == 0 {
            return invalid("table has no buckets".to_owned());
        }
        if self.boundaries.len() != bucket_count + 1 {
            return invalid(format!(
                "{} boundaries for {bucket_count} buckets",
                self.boundaries.len()
            ));
        }
        if self.boundaries.windows(2).any(|pair| pair[0] >= pair[1]) {
            return invalid("boundaries must be strictly increasing".to_owned());
        }
        for (index, (date, start)) in self.dates.iter().zip(&self.boundaries).enumerate() {
            if date.kind() != self.kind || date.day_ordinal() != *start {
                return invalid(format!("bucket {index} does not start on its boundary"));
            }
        }
        if self.counts.len() != bucket_count {
            return invalid(format!(
                "{} count rows for {bucket_count} buckets",
                self.counts.len()
            ));
        }
        let columns = self.group_names.len().max(1);
        if let Some(index) = self.counts.iter().position(|row| row.len() != columns) {
            return invalid(format!("count row {index} does not have {columns} column(s)"));
        }
        if self.n != total_events(&self.counts, self.cumulative) {
            return invalid(format!("n = {} does not match the counts", self.n));
        }
        if self.timespan != self.boundaries[bucket_count - 1] - self.boundaries[0] {
            return invalid(format!("timespan {} does not match the boundaries", self.timespan));
        }
        if self
            .isoweeks
            .as_ref()
            .is_some_and(|weeks| weeks.len() != bucket_count)
        {
            return invalid("isoweeks must have one label per bucket".to_owned());
        }
        Ok(())
    }

    #[must_use]
    pub fn dates(&self) -> &[TimePoint] {
        &self.dates
    }

    #[must_use]
    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    #[must_use]
    pub fn group_names(&self) -> &[String] {
        &self.group_names
    }

    #[must_use]
    pub fn is_grouped(&self) -> bool {
        !self.group_names.is_empty()
    }

    /// Number of count columns, at least one.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.counts.first().map_or(1, Vec::len)
    }

    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.dates.len()
    }

    #[must_use]
    pub fn interval(&self) -> Interval {
        self.interval
    }

    #[must_use]
    pub fn kind(&self) -> TimeKind {
        self.kind
    }

    /// Bucket boundaries as day ordinals, one more than the bucket count.
    #[must_use]
    pub fn boundaries(&self) -> &[i64] {
        &self.boundaries
    }

    /// Days from the first to the last bucket start.
    #[must_use]
    pub fn timespan(&self) -> i64 {
        self.timespan
    }

    /// Number of events counted. For cumulative tables this is the last row
    /// total, not the sum of every cell.
    #[must_use]
    pub fn n(&self) -> u64 {
        self.n
    }

    #[must_use]
    pub fn isoweeks(&self) -> Option<&[String]> {
        self.isoweeks.as_deref()
    }

    #[must_use]
    pub fn is_cumulative(&self) -> bool {
        self.cumulative
    }

    /// Bucket widths in x-axis units (seconds for date-time tables).
    #[must_use]
    pub fn widths(&self) -> Vec<f64> {
        bucket_widths(self.kind, &self.boundaries)
    }

    /// Row totals across groups.
    #[must_use]
    pub fn totals(&self) -> Vec<u64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    #[must_use]
    pub fn group_counts(&self, group: &str) -> Option<Vec<u64>> {
        let column = self.group_names.iter().position(|name| name == group)?;
        Some(self.counts.iter().map(|row| row[column]).collect())
    }
}

fn total_events(counts: &[Vec<u64>], cumulative: bool) -> u64 {
    if cumulative {
        counts.last().map_or(0, |row| row.iter().sum())
    } else {
        counts.iter().flatten().sum()
    }
}

/// Result of an aggregation plus the observations it had to drop or adjust.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub table: IncidenceTable,
    pub diagnostics: Diagnostics,
}

/// Bins event dates into contiguous buckets, optionally cross-tabulated by group.
#[derive(Debug, Clone, Default)]
pub struct IncidenceAggregator {
    config: AggregationConfig,
}

impl IncidenceAggregator {
    #[must_use]
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    pub fn aggregate(
        &self,
        dates: &EventDates,
        groups: Option<&[Option<String>]>,
    ) -> IncidenceResult<Aggregation> {
        if let Some(group_len) = groups.map(<[_]>::len).filter(|&len| len != dates.len()) {
            return Err(IncidenceError::InconsistentGroupLength {
                dates: dates.len(),
                groups: group_len,
            });
        }

        let kind = dates.kind();
        let interval = self.config.validate(kind)?;
        let mut diagnostics = Diagnostics::new();
        let ordinals = day_ordinals(dates, &mut diagnostics);

        let window = DayWindow::new(
            self.config.first_date.map(TimePoint::day_ordinal),
            self.config.last_date.map(TimePoint::day_ordinal),
        );
        let retained = self.retain(&ordinals, groups, window, &mut diagnostics);

        let Some(earliest) = retained.iter().map(|(ordinal, _)| *ordinal).min() else {
            return Err(IncidenceError::EmptyInput);
        };
        let latest = retained
            .iter()
            .map(|(ordinal, _)| *ordinal)
            .chain(window.last)
            .max()
            .unwrap_or(earliest);

        let anchor = window.first.unwrap_or(earliest);
        let rule = resolve_binning(interval, kind, self.config.standard, anchor)?;
        let boundaries = rule.boundaries_covering(latest)?;
        let bucket_count = boundaries.len() - 1;

        let columns = match groups {
            Some(_) => group_columns(&retained, self.config.group_levels.as_deref()),
            None => IndexMap::new(),
        };
        let mut counts = vec![vec![0_u64; columns.len().max(1)]; bucket_count];
        for (ordinal, group) in &retained {
            let row = rule.locate(&boundaries, *ordinal).ok_or_else(|| {
                IncidenceError::InvalidData(format!("day {ordinal} falls outside every bucket"))
            })?;
            let column = columns.get(group).copied().unwrap_or(0);
            counts[row][column] += 1;
        }

        let table = IncidenceTable::from_parts(TableParts {
            kind,
            interval,
            boundaries,
            counts,
            group_names: column_names(columns.keys().copied()),
            iso_weeks: rule.iso_weeks(),
            cumulative: false,
        })?;

        debug!(
            input_count = dates.len(),
            retained = table.n(),
            buckets = table.bucket_count(),
            groups = table.group_names().len(),
            %interval,
            diagnostics = diagnostics.len(),
            "aggregated incidence"
        );
        Ok(Aggregation { table, diagnostics })
    }

    fn retain<'a>(
        &self,
        ordinals: &[Option<i64>],
        groups: Option<&'a [Option<String>]>,
        window: DayWindow,
        diagnostics: &mut Diagnostics,
    ) -> Vec<(i64, Option<&'a str>)> {
        // `None` is the missing-label key for grouped input and the only key otherwise.
        let mut out_of_bounds = 0_usize;
        let mut missing_group = 0_usize;
        let mut retained = Vec::with_capacity(ordinals.len());

        for (index, ordinal) in ordinals.iter().enumerate() {
            let Some(ordinal) = *ordinal else { continue };
            if !window.contains(ordinal) {
                out_of_bounds += 1;
                continue;
            }
            let group = match groups {
                None => None,
                Some(labels) => match labels[index].as_deref() {
                    Some(label) => Some(label),
                    None if self.config.na_as_group => None,
                    None => {
                        missing_group += 1;
                        continue;
                    }
                },
            };
            retained.push((ordinal, group));
        }

        if out_of_bounds > 0 {
            diagnostics.report(
                DiagnosticKind::OutOfBounds,
                format!("{out_of_bounds} observation(s) outside [first_date, last_date] were dropped"),
            );
        }
        if missing_group > 0 {
            diagnostics.report(
                DiagnosticKind::MissingGroup,
                format!("{missing_group} observation(s) with a missing group were dropped"),
            );
        }
        trace!(retained = retained.len(), out_of_bounds, missing_group, "filtered observations");
        retained
    }
}

/// Converts inputs to day ordinals without touching the caller's values.
fn day_ordinals(dates: &EventDates, diagnostics: &mut Diagnostics) -> Vec<Option<i64>> {
    let mut truncated = 0_usize;
    let ordinals: Vec<Option<i64>> = match dates {
        EventDates::Numeric(values) => values
            .iter()
            .map(|value| {
                let value = (*value).filter(|v| v.is_finite())?;
                let floored = value.floor();
                if floored != value {
                    truncated += 1;
                }
                // Casting saturates; reject anything that did not fit.
                let ordinal = floored as i64;
                (ordinal as f64 == floored).then_some(ordinal)
            })
            .collect(),
        EventDates::CalendarDate(values) => values
            .iter()
            .map(|value| value.map(|date| TimePoint::Date(date).day_ordinal()))
            .collect(),
        EventDates::DateTime(values) => values
            .iter()
            .map(|value| value.map(|time| TimePoint::DateTime(time).day_ordinal()))
            .collect(),
    };

    if truncated > 0 {
        diagnostics.report(
            DiagnosticKind::NonIntegerTruncated,
            format!("{truncated} non-integer value(s) were floored to whole days"),
        );
    }
    let missing = ordinals.iter().filter(|ordinal| ordinal.is_none()).count();
    if missing > 0 {
        diagnostics.report(
            DiagnosticKind::MissingDate,
            format!("{missing} missing date(s) were dropped"),
        );
    }
    ordinals
}

fn group_columns<'a>(
    retained: &[(i64, Option<&'a str>)],
    levels: Option<&'a [String]>,
) -> IndexMap<Option<&'a str>, usize> {
    let observed: BTreeSet<&str> = retained.iter().filter_map(|(_, group)| *group).collect();
    let has_missing = retained.iter().any(|(_, group)| group.is_none());
    let mut columns: IndexMap<Option<&str>, usize> = IndexMap::new();

    let declared = levels.unwrap_or_default().iter().map(|level| Some(level.as_str()));
    let natural = observed.iter().map(|label| Some(*label));
    let missing = has_missing.then_some(None);

    for key in declared.chain(natural).chain(missing) {
        let next = columns.len();
        columns.entry(key).or_insert(next);
    }
    columns
}

/// Display names for the column keys; the missing key gets a label no real
/// group uses.
fn column_names<'a>(keys: impl Iterator<Item = Option<&'a str>> + Clone) -> Vec<String> {
    let taken: BTreeSet<&str> = keys.clone().flatten().collect();
    let missing_label = std::iter::once(MISSING_GROUP_LABEL.to_owned())
        .chain((1..).map(|suffix| format!("{MISSING_GROUP_LABEL}_{suffix}")))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| MISSING_GROUP_LABEL.to_owned());

    keys.map(|key| key.map_or_else(|| missing_label.clone(), str::to_owned))
        .collect()
}

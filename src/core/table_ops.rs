use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::incidence::{IncidenceTable, TableParts};
use crate::core::time::TimePoint;
use crate::core::windowing::starts_in_window;
use crate::error::{IncidenceError, IncidenceResult};

/// Which point of a bucket to report as its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BucketPosition {
    Left,
    Center,
    Right,
}

/// One bucket x group cell of the long-format view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongRow {
    pub date: TimePoint,
    pub group: Option<String>,
    pub count: u64,
}

impl IncidenceTable {
    /// Running totals per group; the result is flagged cumulative.
    pub fn cumulate(&self) -> IncidenceResult<Self> {
        if self.cumulative {
            return Err(IncidenceError::InvalidData(
                "incidence is already cumulative".to_owned(),
            ));
        }

        let mut running = vec![0_u64; self.group_count()];
        let counts = self
            .counts
            .iter()
            .map(|row| {
                for (total, count) in running.iter_mut().zip(row) {
                    *total += count;
                }
                running.clone()
            })
            .collect();

        let mut parts = self.parts_with(self.boundaries.clone(), counts);
        parts.cumulative = true;
        Self::from_parts(parts)
    }

    /// Collapses every group into a single unnamed column.
    pub fn pool(&self) -> IncidenceResult<Self> {
        let counts = self.totals().into_iter().map(|total| vec![total]).collect();
        let parts = TableParts {
            group_names: Vec::new(),
            ..self.parts_with(self.boundaries.clone(), counts)
        };
        Self::from_parts(parts)
    }

    /// Keeps buckets whose start lies in `[from, to]` (inclusive).
    pub fn subset(&self, from: TimePoint, to: TimePoint) -> IncidenceResult<Self> {
        for bound in [from, to] {
            if bound.kind() != self.kind {
                return Err(IncidenceError::InvalidData(format!(
                    "subset bound is {:?} but the table holds {:?}",
                    bound.kind(),
                    self.kind
                )));
            }
        }

        let starts = &self.boundaries[..self.bucket_count()];
        let range = starts_in_window(starts, from.day_ordinal(), to.day_ordinal());
        if range.is_empty() {
            return Err(IncidenceError::EmptyInput);
        }

        debug!(from = range.start, to = range.end, "subset incidence buckets");
        let boundaries = self.boundaries[range.start..=range.end].to_vec();
        let counts = self.counts[range].to_vec();
        Self::from_parts(self.parts_with(boundaries, counts))
    }

    /// Start of the bucket with the largest total; ties resolve to the earliest.
    #[must_use]
    pub fn find_peak(&self) -> Option<TimePoint> {
        let totals = self.totals();
        let max = *totals.iter().max()?;
        let index = totals.iter().position(|&total| total == max)?;
        self.dates.get(index).copied()
    }

    /// Bucket left edges, midpoints or right edges as x-axis values.
    #[must_use]
    pub fn bucket_dates(&self, position: BucketPosition) -> Vec<f64> {
        let widths = self.widths();
        self.dates
            .iter()
            .zip(widths)
            .map(|(date, width)| {
                let start = date.axis_value();
                match position {
                    BucketPosition::Left => start,
                    BucketPosition::Center => start + width * 0.5,
                    BucketPosition::Right => start + width,
                }
            })
            .collect()
    }

    /// One row per bucket and count column, in bucket-major order.
    #[must_use]
    pub fn to_long(&self) -> Vec<LongRow> {
        let mut rows = Vec::with_capacity(self.bucket_count() * self.group_count());
        for (date, row) in self.dates.iter().zip(&self.counts) {
            for (column, count) in row.iter().enumerate() {
                rows.push(LongRow {
                    date: *date,
                    group: self.group_names.get(column).cloned(),
                    count: *count,
                });
            }
        }
        rows
    }

    /// Per-column event totals; the last row for cumulative tables.
    #[must_use]
    pub fn group_totals(&self) -> Vec<u64> {
        if self.cumulative {
            return self.counts.last().cloned().unwrap_or_default();
        }
        let mut totals = vec![0_u64; self.group_count()];
        for row in &self.counts {
            for (total, count) in totals.iter_mut().zip(row) {
                *total += count;
            }
        }
        totals
    }
}

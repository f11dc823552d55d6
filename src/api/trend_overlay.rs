use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{TimeKind, TimePoint};
use crate::error::{IncidenceError, IncidenceResult};
use crate::render::{Color, LineStrokeStyle, PaletteFn, TrendLine, TrendRole};

use super::fill_resolver::palette_colors;

/// One predicted point of an externally fitted trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitRow {
    pub time: TimePoint,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
    #[serde(default)]
    pub group: Option<String>,
}

impl FitRow {
    #[must_use]
    pub fn new(time: TimePoint, predicted: f64, lower: f64, upper: f64) -> Self {
        Self {
            time,
            predicted,
            lower,
            upper,
            group: None,
        }
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Table of fitted values produced by an external model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendFit {
    pub rows: Vec<FitRow>,
}

impl TrendFit {
    #[must_use]
    pub fn new(rows: Vec<FitRow>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn is_grouped(&self) -> bool {
        self.rows.iter().any(|row| row.group.is_some())
    }

    fn validate(&self, kind: TimeKind, position: Option<usize>) -> IncidenceResult<()> {
        let invalid = |reason: String| IncidenceError::InvalidFitInput { position, reason };

        if self.rows.is_empty() {
            return Err(invalid("fit has no rows".to_owned()));
        }
        for (index, row) in self.rows.iter().enumerate() {
            if row.time.kind() != kind {
                return Err(invalid(format!(
                    "row {index} is {:?} but the incidence is {kind:?}",
                    row.time.kind()
                )));
            }
            if !row.predicted.is_finite() || !row.lower.is_finite() || !row.upper.is_finite() {
                return Err(invalid(format!("row {index} has non-finite values")));
            }
            if row.lower > row.upper {
                return Err(invalid(format!("row {index} has lower > upper")));
            }
        }
        Ok(())
    }
}

/// Trend overlay argument: nothing, one fit, or a collection of fits.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FitOverlay {
    #[default]
    None,
    Single(TrendFit),
    Many(Vec<TrendFit>),
}

impl From<TrendFit> for FitOverlay {
    fn from(fit: TrendFit) -> Self {
        Self::Single(fit)
    }
}

impl From<Vec<TrendFit>> for FitOverlay {
    fn from(fits: Vec<TrendFit>) -> Self {
        Self::Many(fits)
    }
}

impl FitOverlay {
    /// Flattens to `(position, fit)` pairs; a single fit carries no position.
    #[must_use]
    pub fn items(&self) -> Vec<(Option<usize>, &TrendFit)> {
        match self {
            Self::None => Vec::new(),
            Self::Single(fit) => vec![(None, fit)],
            Self::Many(fits) => fits.iter().enumerate().map(|(i, fit)| (Some(i), fit)).collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

pub(super) struct TrendStyle<'a> {
    pub kind: TimeKind,
    pub group_fills: &'a IndexMap<String, Color>,
    pub palette: &'a PaletteFn,
    pub default_color: Color,
}

/// Validates every fit, then draws a solid center line and dashed bounds per
/// fit and group.
pub(super) fn trend_lines(
    overlay: &FitOverlay,
    style: &TrendStyle<'_>,
) -> IncidenceResult<Vec<TrendLine>> {
    let items = overlay.items();
    for (position, fit) in &items {
        fit.validate(style.kind, *position)?;
    }

    let mut lines = Vec::new();
    for (fit_index, (_, fit)) in items.iter().enumerate() {
        let mut series: IndexMap<Option<&str>, Vec<&FitRow>> = IndexMap::new();
        for row in &fit.rows {
            series.entry(row.group.as_deref()).or_default().push(row);
        }

        let colors = series_colors(&series, style)?;
        for ((group, rows), color) in series.into_iter().zip(colors) {
            lines.extend(series_lines(fit_index, group, rows, color));
        }
    }
    Ok(lines)
}

fn series_colors(
    series: &IndexMap<Option<&str>, Vec<&FitRow>>,
    style: &TrendStyle<'_>,
) -> IncidenceResult<Vec<Color>> {
    let groups: Vec<Option<&str>> = series.keys().copied().collect();
    if groups.iter().all(Option::is_none) {
        return Ok(vec![style.default_color; groups.len()]);
    }

    let from_bars: Option<Vec<Color>> = groups
        .iter()
        .map(|group| group.and_then(|name| style.group_fills.get(name).copied()))
        .collect();
    match from_bars {
        Some(colors) => Ok(colors),
        None => palette_colors(style.palette, groups.len()),
    }
}

fn series_lines(
    fit_index: usize,
    group: Option<&str>,
    mut rows: Vec<&FitRow>,
    color: Color,
) -> SmallVec<[TrendLine; 3]> {
    rows.sort_by_key(|row| OrderedFloat(row.time.axis_value()));

    let line = |role: TrendRole, stroke: LineStrokeStyle, value: fn(&FitRow) -> f64| TrendLine {
        fit_index,
        group: group.map(str::to_owned),
        role,
        stroke,
        color,
        points: rows.iter().map(|row| (row.time.axis_value(), value(row))).collect(),
    };

    SmallVec::from_buf([
        line(TrendRole::Predicted, LineStrokeStyle::Solid, |row| row.predicted),
        line(TrendRole::Lower, LineStrokeStyle::Dashed, |row| row.lower),
        line(TrendRole::Upper, LineStrokeStyle::Dashed, |row| row.upper),
    ])
}

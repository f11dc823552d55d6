//! Declarative chart description handed to an external plotting engine.
//!
//! Every position is expressed in x-axis units (see `TimeKind::axis_units_per_day`)
//! and counts on the y-axis; nothing here is in pixels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::TimeKind;
use crate::error::{IncidenceError, IncidenceResult};

use super::{ChartLayerKind, Color, LineStrokeStyle};

/// How bars of several groups share one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarLayout {
    #[default]
    Stack,
    Dodge,
}

/// Filled rectangle for one bucket x group bar, or one case tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarRect {
    pub bucket: usize,
    pub group: Option<String>,
    pub x_center: f64,
    pub width: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub fill: Color,
    pub border: Option<Color>,
}

impl BarRect {
    #[must_use]
    pub fn x_left(&self) -> f64 {
        self.x_center - self.width * 0.5
    }

    #[must_use]
    pub fn x_right(&self) -> f64 {
        self.x_center + self.width * 0.5
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    fn validate(&self) -> IncidenceResult<()> {
        if !self.x_center.is_finite()
            || !self.y_min.is_finite()
            || !self.y_max.is_finite()
            || self.y_max < self.y_min
        {
            return Err(IncidenceError::InvalidData(format!(
                "bar for bucket {} has invalid coordinates",
                self.bucket
            )));
        }
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(IncidenceError::InvalidData(format!(
                "bar for bucket {} must have a finite width > 0",
                self.bucket
            )));
        }
        self.fill.validate()?;
        self.border.map_or(Ok(()), Color::validate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarLayer {
    pub layout: BarLayout,
    pub bars: Vec<BarRect>,
}

/// Unit-height rectangles, one per case, stacked inside each bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseTileLayer {
    pub tiles: Vec<BarRect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendRole {
    Predicted,
    Lower,
    Upper,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub fit_index: usize,
    pub group: Option<String>,
    pub role: TrendRole,
    pub stroke: LineStrokeStyle,
    pub color: Color,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendLayer {
    pub lines: Vec<TrendLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChartLayer {
    Bars(BarLayer),
    CaseTiles(CaseTileLayer),
    Trend(TrendLayer),
}

impl ChartLayer {
    #[must_use]
    pub fn kind(&self) -> ChartLayerKind {
        match self {
            Self::Bars(_) => ChartLayerKind::Bars,
            Self::CaseTiles(_) => ChartLayerKind::CaseTiles,
            Self::Trend(_) => ChartLayerKind::Trend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisBreak {
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepUnit {
    Day,
    Week,
    Month,
    Year,
}

/// Secondary tick cadence for calendar axes, e.g. "2 months".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarStep {
    pub count: u32,
    pub unit: StepUnit,
}

impl fmt::Display for CalendarStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            StepUnit::Day => "day",
            StepUnit::Week => "week",
            StepUnit::Month => "month",
            StepUnit::Year => "year",
        };
        let plural = if self.count == 1 { "" } else { "s" };
        write!(f, "{} {unit}{plural}", self.count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XAxisSpec {
    pub kind: TimeKind,
    pub title: String,
    pub domain: (f64, f64),
    pub breaks: Vec<AxisBreak>,
    pub calendar_step: Option<CalendarStep>,
    pub iso_weeks: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YAxisSpec {
    pub title: String,
    pub domain: (f64, f64),
    pub breaks: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillScale {
    pub entries: Vec<LegendEntry>,
    pub show_legend: bool,
}

/// Fully composed chart: axes, fill scale and layers in drawing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub x_axis: XAxisSpec,
    pub y_axis: YAxisSpec,
    pub fill_scale: FillScale,
    pub layers: Vec<ChartLayer>,
}

impl ChartSpec {
    #[must_use]
    pub fn layer(&self, kind: ChartLayerKind) -> Option<&ChartLayer> {
        self.layers.iter().find(|layer| layer.kind() == kind)
    }

    #[must_use]
    pub fn bar_layer(&self) -> Option<&BarLayer> {
        match self.layer(ChartLayerKind::Bars)? {
            ChartLayer::Bars(layer) => Some(layer),
            _ => None,
        }
    }

    #[must_use]
    pub fn case_tile_layer(&self) -> Option<&CaseTileLayer> {
        match self.layer(ChartLayerKind::CaseTiles)? {
            ChartLayer::CaseTiles(layer) => Some(layer),
            _ => None,
        }
    }

    #[must_use]
    pub fn trend_layer(&self) -> Option<&TrendLayer> {
        match self.layer(ChartLayerKind::Trend)? {
            ChartLayer::Trend(layer) => Some(layer),
            _ => None,
        }
    }

    /// Distinct bar fills in first-seen order.
    #[must_use]
    pub fn distinct_fills(&self) -> Vec<Color> {
        let mut fills: Vec<Color> = Vec::new();
        for bar in self.bar_layer().map(|layer| layer.bars.as_slice()).unwrap_or_default() {
            if !fills.contains(&bar.fill) {
                fills.push(bar.fill);
            }
        }
        fills
    }

    pub fn validate(&self) -> IncidenceResult<()> {
        let (x_min, x_max) = self.x_axis.domain;
        if !x_min.is_finite() || !x_max.is_finite() || x_min >= x_max {
            return Err(IncidenceError::InvalidData(
                "x-axis domain must be finite and non-empty".to_owned(),
            ));
        }
        if self.x_axis.breaks.iter().any(|b| !b.position.is_finite()) {
            return Err(IncidenceError::InvalidData(
                "x-axis breaks must be finite".to_owned(),
            ));
        }
        for entry in &self.fill_scale.entries {
            entry.color.validate()?;
        }

        for layer in &self.layers {
            match layer {
                ChartLayer::Bars(layer) => layer.bars.iter().try_for_each(BarRect::validate)?,
                ChartLayer::CaseTiles(layer) => layer.tiles.iter().try_for_each(BarRect::validate)?,
                ChartLayer::Trend(layer) => {
                    for line in &layer.lines {
                        line.color.validate()?;
                        if line.points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
                            return Err(IncidenceError::InvalidData(
                                "trend line points must be finite".to_owned(),
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

use indexmap::IndexMap;
use tracing::debug;

use crate::core::{IncidenceTable, left_aligned_center};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::IncidenceResult;
use crate::render::{
    BarLayer, BarLayout, BarRect, CaseTileLayer, ChartLayer, ChartSpec, Color, FillScale,
    LegendEntry, PaletteFn, TrendLayer, XAxisSpec, YAxisSpec, default_palette,
};

use super::axis_labels::{default_x_title, default_y_title};
use super::axis_ticks::{calendar_step, pretty_breaks, x_axis_breaks};
use super::fill_resolver::resolve_fills;
use super::trend_overlay::{TrendStyle, trend_lines};
use super::{ChartOptions, FitOverlay};

/// Chart description plus the non-fatal issues met while composing it.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltChart {
    pub spec: ChartSpec,
    pub diagnostics: Diagnostics,
}

/// Composes a `ChartSpec` from an incidence table.
///
/// Bars are left-aligned on their bucket start and span the bucket width.
/// Stacked layouts pile groups in column order; dodged layouts split the
/// bucket into one slot per column.
pub struct ChartBuilder<'a> {
    table: &'a IncidenceTable,
    options: ChartOptions,
    palette: PaletteFn,
    fits: FitOverlay,
}

impl<'a> ChartBuilder<'a> {
    #[must_use]
    pub fn new(table: &'a IncidenceTable) -> Self {
        Self {
            table,
            options: ChartOptions::default(),
            palette: default_palette(),
            fits: FitOverlay::None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ChartOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: PaletteFn) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn with_fits(mut self, fits: impl Into<FitOverlay>) -> Self {
        self.fits = fits.into();
        self
    }

    pub fn build(&self) -> IncidenceResult<BuiltChart> {
        self.options.validate()?;
        let table = self.table;
        table.validate()?;

        let mut diagnostics = Diagnostics::new();
        let column_count = table.group_count();
        let base_fills = resolve_fills(
            table.group_names(),
            column_count,
            self.options.color.as_ref(),
            &self.palette,
            &mut diagnostics,
        )?;
        let fills: Vec<Color> = base_fills
            .iter()
            .map(|color| color.with_alpha(self.options.alpha))
            .collect();

        let geometry = BucketGeometry::new(table);
        let mut layers = vec![ChartLayer::Bars(BarLayer {
            layout: self.options.layout,
            bars: self.bars(&geometry, &fills),
        })];

        if self.options.show_cases {
            match self.options.layout {
                BarLayout::Stack => layers.push(ChartLayer::CaseTiles(CaseTileLayer {
                    tiles: self.case_tiles(&geometry, &fills),
                })),
                BarLayout::Dodge => diagnostics.report(
                    DiagnosticKind::IncompatibleOptions,
                    "case tiles need stacked bars; the overlay was skipped".to_owned(),
                ),
            }
        }

        if !self.fits.is_empty() {
            let group_fills: IndexMap<String, Color> = table
                .group_names()
                .iter()
                .cloned()
                .zip(base_fills.iter().copied())
                .collect();
            let lines = trend_lines(
                &self.fits,
                &TrendStyle {
                    kind: table.kind(),
                    group_fills: &group_fills,
                    palette: &self.palette,
                    default_color: self.options.fit_color,
                },
            )?;
            layers.push(ChartLayer::Trend(TrendLayer { lines }));
        }
        layers.sort_by_key(|layer| layer.kind().z_index());

        let spec = ChartSpec {
            x_axis: self.x_axis(&geometry)?,
            y_axis: self.y_axis(),
            fill_scale: FillScale {
                entries: table
                    .group_names()
                    .iter()
                    .zip(&fills)
                    .map(|(label, color)| LegendEntry {
                        label: label.clone(),
                        color: *color,
                    })
                    .collect(),
                show_legend: column_count > 1,
            },
            layers,
        };
        spec.validate()?;

        debug!(
            buckets = table.bucket_count(),
            columns = column_count,
            layout = ?self.options.layout,
            layers = spec.layers.len(),
            diagnostics = diagnostics.len(),
            "built incidence chart"
        );
        Ok(BuiltChart { spec, diagnostics })
    }

    fn group_label(&self, column: usize) -> Option<String> {
        self.table.group_names().get(column).cloned()
    }

    fn bars(&self, geometry: &BucketGeometry, fills: &[Color]) -> Vec<BarRect> {
        let mut bars = Vec::new();
        for (bucket, row) in self.table.counts().iter().enumerate() {
            let (start, width) = geometry.bucket(bucket);
            let slot = width / row.len().max(1) as f64;
            let mut offset = 0.0;

            for (column, &count) in row.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                let height = count as f64;
                let (x_center, bar_width, y_min) = match self.options.layout {
                    BarLayout::Stack => (left_aligned_center(start, width), width, offset),
                    BarLayout::Dodge => (start + slot * (column as f64 + 0.5), slot, 0.0),
                };
                bars.push(BarRect {
                    bucket,
                    group: self.group_label(column),
                    x_center,
                    width: bar_width,
                    y_min,
                    y_max: y_min + height,
                    fill: fills[column],
                    border: self.options.border,
                });
                offset += height;
            }
        }
        bars
    }

    fn case_tiles(&self, geometry: &BucketGeometry, fills: &[Color]) -> Vec<BarRect> {
        let border = self.options.border.unwrap_or(Color::WHITE);
        let mut tiles = Vec::new();
        for (bucket, row) in self.table.counts().iter().enumerate() {
            let (start, width) = geometry.bucket(bucket);
            let x_center = left_aligned_center(start, width);
            let mut level = 0_u64;

            for (column, &count) in row.iter().enumerate() {
                for _ in 0..count {
                    tiles.push(BarRect {
                        bucket,
                        group: self.group_label(column),
                        x_center,
                        width,
                        y_min: level as f64,
                        y_max: (level + 1) as f64,
                        fill: fills[column],
                        border: Some(border),
                    });
                    level += 1;
                }
            }
        }
        tiles
    }

    fn x_axis(&self, geometry: &BucketGeometry) -> IncidenceResult<XAxisSpec> {
        let table = self.table;
        let iso_weeks = self.options.iso_week_labels && table.isoweeks().is_some();
        Ok(XAxisSpec {
            kind: table.kind(),
            title: self
                .options
                .x_title
                .clone()
                .unwrap_or_else(|| default_x_title(table.kind())),
            domain: geometry.domain(),
            breaks: x_axis_breaks(table, self.options.n_breaks, iso_weeks)?,
            calendar_step: calendar_step(table, self.options.n_breaks),
            iso_weeks,
        })
    }

    fn y_axis(&self) -> YAxisSpec {
        let table = self.table;
        let peak = match self.options.layout {
            BarLayout::Stack => table.totals().into_iter().max(),
            BarLayout::Dodge => table.counts().iter().flatten().copied().max(),
        }
        .unwrap_or(0)
        .max(1) as f64;

        YAxisSpec {
            title: self
                .options
                .y_title
                .clone()
                .unwrap_or_else(|| default_y_title(table.interval(), table.is_cumulative())),
            domain: (0.0, peak),
            breaks: pretty_breaks(0.0, peak, self.options.n_breaks, 1.0),
        }
    }
}

/// Bucket starts and widths in x-axis units.
struct BucketGeometry {
    starts: Vec<f64>,
    widths: Vec<f64>,
    end: f64,
}

impl BucketGeometry {
    fn new(table: &IncidenceTable) -> Self {
        let kind = table.kind();
        let boundaries = table.boundaries();
        let starts = boundaries[..boundaries.len() - 1]
            .iter()
            .map(|&day| kind.ordinal_to_axis(day as f64))
            .collect();
        let end = boundaries
            .last()
            .map_or(0.0, |&day| kind.ordinal_to_axis(day as f64));
        Self {
            starts,
            widths: table.widths(),
            end,
        }
    }

    fn bucket(&self, index: usize) -> (f64, f64) {
        (self.starts[index], self.widths[index])
    }

    fn domain(&self) -> (f64, f64) {
        (self.starts.first().copied().unwrap_or(self.end), self.end)
    }
}

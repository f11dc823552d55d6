use std::sync::Arc;

use approx::assert_relative_eq;
use chrono::NaiveDate;
use incidence_rs::api::{ChartBuilder, ChartOptions, ColorSpec, FitRow, TrendFit};
use incidence_rs::core::{AggregationConfig, EventDates, IncidenceAggregator, IncidenceTable, TimePoint};
use incidence_rs::render::{
    BarLayout, ChartLayerKind, ChartSpec, Color, LineStrokeStyle, StepUnit, TrendRole,
    qualitative_colors,
};
use incidence_rs::{DiagnosticKind, IncidenceError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn daily_table() -> IncidenceTable {
    IncidenceAggregator::default()
        .aggregate(&EventDates::integers([1, 1, 2, 2, 2, 3]), None)
        .expect("aggregate")
        .table
}

fn grouped_table() -> IncidenceTable {
    let groups: Vec<Option<String>> = ["a", "b", "a", "a", "b", "b"]
        .iter()
        .map(|label| Some((*label).to_owned()))
        .collect();
    IncidenceAggregator::default()
        .aggregate(&EventDates::integers([1, 1, 2, 4, 4, 4]), Some(&groups))
        .expect("aggregate")
        .table
}

#[test]
fn ungrouped_chart_uses_default_titles_and_no_legend() {
    let built = ChartBuilder::new(&daily_table()).build().expect("build");
    let spec = built.spec;

    assert_eq!(spec.x_axis.title, "Time");
    assert_eq!(spec.y_axis.title, "Daily incidence");
    assert_eq!(spec.x_axis.domain, (1.0, 4.0));
    assert_eq!(spec.y_axis.domain, (0.0, 3.0));
    assert!(!spec.fill_scale.show_legend);
    assert!(spec.fill_scale.entries.is_empty());
    assert!(built.diagnostics.is_empty());

    let bars = &spec.bar_layer().expect("bars").bars;
    assert_eq!(bars.len(), 3);
    assert_relative_eq!(bars[0].x_left(), 1.0);
    assert_relative_eq!(bars[0].x_right(), 2.0);
    assert_relative_eq!(bars[1].height(), 3.0);
    assert_relative_eq!(bars[0].fill.alpha, 0.7);
}

#[test]
fn stacked_bars_pile_groups_in_column_order() {
    let table = grouped_table();
    let spec = ChartBuilder::new(&table).build().expect("build").spec;
    let bars = &spec.bar_layer().expect("bars").bars;

    // Zero cells are not drawn.
    assert_eq!(bars.len(), 5);
    let last: Vec<_> = bars.iter().filter(|bar| bar.bucket == 3).collect();
    assert_eq!(last.len(), 2);
    assert_eq!(last[0].group.as_deref(), Some("a"));
    assert_relative_eq!(last[0].y_min, 0.0);
    assert_relative_eq!(last[0].y_max, 1.0);
    assert_eq!(last[1].group.as_deref(), Some("b"));
    assert_relative_eq!(last[1].y_min, 1.0);
    assert_relative_eq!(last[1].y_max, 3.0);

    assert_eq!(spec.y_axis.domain, (0.0, 3.0));
    assert!(spec.fill_scale.show_legend);
    assert_eq!(spec.fill_scale.entries.len(), 2);
    assert_eq!(spec.fill_scale.entries[0].label, "a");
}

#[test]
fn dodged_bars_split_the_bucket_width() {
    let table = grouped_table();
    let options = ChartOptions::default().with_layout(BarLayout::Dodge);
    let spec = ChartBuilder::new(&table)
        .with_options(options)
        .build()
        .expect("build")
        .spec;
    let bars = &spec.bar_layer().expect("bars").bars;

    let first: Vec<_> = bars.iter().filter(|bar| bar.bucket == 0).collect();
    assert_relative_eq!(first[0].width, 0.5);
    assert_relative_eq!(first[0].x_center, 1.25);
    assert_relative_eq!(first[1].x_center, 1.75);
    assert!(bars.iter().all(|bar| bar.y_min == 0.0));
    assert_eq!(spec.y_axis.domain, (0.0, 2.0));
}

#[test]
fn case_tiles_are_unit_height_and_cover_every_case() {
    let table = daily_table();
    let options = ChartOptions::default().with_show_cases(true);
    let spec = ChartBuilder::new(&table)
        .with_options(options)
        .build()
        .expect("build")
        .spec;

    let tiles = &spec.case_tile_layer().expect("tiles").tiles;
    assert_eq!(tiles.len() as u64, table.n());
    assert!(tiles.iter().all(|tile| (tile.height() - 1.0).abs() < 1e-12));
    assert!(tiles.iter().all(|tile| tile.border == Some(Color::WHITE)));
    let top = tiles.iter().filter(|tile| tile.bucket == 1).map(|tile| tile.y_max);
    assert_relative_eq!(top.fold(0.0, f64::max), 3.0);

    let kinds: Vec<_> = spec.layers.iter().map(|layer| layer.kind()).collect();
    assert_eq!(kinds, vec![ChartLayerKind::Bars, ChartLayerKind::CaseTiles]);
}

#[test]
fn case_tiles_with_dodge_are_skipped_with_a_diagnostic() {
    let table = grouped_table();
    let options = ChartOptions::default()
        .with_layout(BarLayout::Dodge)
        .with_show_cases(true);
    let built = ChartBuilder::new(&table)
        .with_options(options)
        .build()
        .expect("build");

    assert!(built.diagnostics.contains(DiagnosticKind::IncompatibleOptions));
    assert!(built.spec.case_tile_layer().is_none());
    assert_eq!(built.spec.bar_layer().expect("bars").layout, BarLayout::Dodge);
    assert_eq!(built.spec.bar_layer().expect("bars").bars.len(), 5);
}

#[test]
fn wrong_color_count_falls_back_to_the_palette() {
    let table = grouped_table();
    let options = ChartOptions::default().with_color(ColorSpec::ByPosition(vec![
        Color::BLACK,
        Color::WHITE,
        Color::rgb(1.0, 0.0, 0.0),
    ]));
    let built = ChartBuilder::new(&table)
        .with_options(options)
        .build()
        .expect("build");

    assert!(built.diagnostics.contains(DiagnosticKind::ColorCountMismatch));
    let fills = built.spec.distinct_fills();
    assert_eq!(fills.len(), 2);
    let expected: Vec<Color> = qualitative_colors(2)
        .into_iter()
        .map(|color| color.with_alpha(0.7))
        .collect();
    assert_eq!(fills, expected);
}

#[test]
fn explicit_colors_and_border_are_applied() {
    let table = daily_table();
    let red = Color::rgb(1.0, 0.0, 0.0);
    let options = ChartOptions::default()
        .with_color(ColorSpec::Single(red))
        .with_border(Color::BLACK)
        .with_alpha(1.0);
    let spec = ChartBuilder::new(&table)
        .with_options(options)
        .build()
        .expect("build")
        .spec;

    let bars = &spec.bar_layer().expect("bars").bars;
    assert!(bars.iter().all(|bar| bar.fill == red));
    assert!(bars.iter().all(|bar| bar.border == Some(Color::BLACK)));
}

#[test]
fn short_palette_is_an_error() {
    let table = grouped_table();
    let result = ChartBuilder::new(&table)
        .with_palette(Arc::new(|_count: usize| Vec::<Color>::new()))
        .build();
    assert!(matches!(result, Err(IncidenceError::InvalidData(_))));
}

#[test]
fn invalid_options_are_rejected() {
    let table = daily_table();
    let result = ChartBuilder::new(&table)
        .with_options(ChartOptions::default().with_alpha(1.5))
        .build();
    assert!(matches!(result, Err(IncidenceError::InvalidData(_))));
}

#[test]
fn y_titles_follow_interval_and_cumulation() {
    let weekly = IncidenceAggregator::new(AggregationConfig::default().with_interval(7))
        .aggregate(&EventDates::integers([1, 9, 20]), None)
        .expect("aggregate")
        .table;
    let spec = ChartBuilder::new(&weekly).build().expect("build").spec;
    assert_eq!(spec.y_axis.title, "Weekly incidence");

    let cumulative = daily_table().cumulate().expect("cumulate");
    let spec = ChartBuilder::new(&cumulative).build().expect("build").spec;
    assert_eq!(spec.y_axis.title, "Cumulative daily incidence");
    assert_eq!(spec.y_axis.domain, (0.0, 6.0));

    let custom = ChartOptions::default()
        .with_x_title("Onset")
        .with_y_title("Cases");
    let spec = ChartBuilder::new(&weekly)
        .with_options(custom)
        .build()
        .expect("build")
        .spec;
    assert_eq!(spec.x_axis.title, "Onset");
    assert_eq!(spec.y_axis.title, "Cases");
}

#[test]
fn numeric_axis_gets_pretty_integer_breaks() {
    let spec = ChartBuilder::new(&grouped_table()).build().expect("build").spec;
    let labels: Vec<&str> = spec
        .x_axis
        .breaks
        .iter()
        .map(|b| b.label.as_str())
        .collect();
    assert_eq!(labels, vec!["1", "2", "3", "4", "5"]);
    assert!(spec.x_axis.calendar_step.is_none());
    assert_eq!(spec.y_axis.breaks, vec![0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn weekly_date_axis_uses_iso_week_labels() {
    let dates = EventDates::dates([date(2021, 1, 3), date(2021, 1, 4), date(2021, 1, 12)]);
    let table = IncidenceAggregator::new(AggregationConfig::default().with_interval("week"))
        .aggregate(&dates, None)
        .expect("aggregate")
        .table;

    let spec = ChartBuilder::new(&table).build().expect("build").spec;
    assert_eq!(spec.x_axis.title, "Date");
    assert!(spec.x_axis.iso_weeks);
    let labels: Vec<&str> = spec
        .x_axis
        .breaks
        .iter()
        .map(|b| b.label.as_str())
        .collect();
    assert_eq!(labels, vec!["2020-W53", "2021-W01", "2021-W02"]);

    let plain = ChartBuilder::new(&table)
        .with_options(ChartOptions::default().with_iso_week_labels(false))
        .build()
        .expect("build")
        .spec;
    assert!(!plain.x_axis.iso_weeks);
    assert!(plain.x_axis.breaks.iter().all(|b| b.label.starts_with("202")));
}

#[test]
fn monthly_axis_carries_a_calendar_step() {
    let dates = EventDates::dates((1..=12).map(|month| date(2024, month, 15)));
    let table = IncidenceAggregator::new(AggregationConfig::default().with_interval("month"))
        .aggregate(&dates, None)
        .expect("aggregate")
        .table;

    let step = ChartBuilder::new(&table)
        .build()
        .expect("build")
        .spec
        .x_axis
        .calendar_step
        .expect("calendar step");
    assert_eq!(step.unit, StepUnit::Month);
    assert_eq!(step.count, 2);
    assert_eq!(step.to_string(), "2 months");
}

#[test]
fn trend_overlay_draws_solid_center_and_dashed_bounds() {
    let table = daily_table();
    let fit = TrendFit::new(vec![
        FitRow::new(TimePoint::Numeric(3), 3.0, 2.0, 4.0),
        FitRow::new(TimePoint::Numeric(1), 1.0, 0.5, 1.5),
        FitRow::new(TimePoint::Numeric(2), 2.0, 1.0, 3.0),
    ]);
    let spec = ChartBuilder::new(&table)
        .with_fits(fit)
        .build()
        .expect("build")
        .spec;

    let kinds: Vec<_> = spec.layers.iter().map(|layer| layer.kind()).collect();
    assert_eq!(kinds, vec![ChartLayerKind::Bars, ChartLayerKind::Trend]);

    let lines = &spec.trend_layer().expect("trend").lines;
    assert_eq!(lines.len(), 3);
    let predicted = &lines[0];
    assert_eq!(predicted.role, TrendRole::Predicted);
    assert_eq!(predicted.stroke, LineStrokeStyle::Solid);
    assert_eq!(predicted.points, vec![(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
    assert!(lines[1..].iter().all(|line| line.stroke == LineStrokeStyle::Dashed));
    assert_eq!(lines[2].points[0], (1.0, 1.5));
    assert_eq!(predicted.color, ChartOptions::default().fit_color);
}

#[test]
fn grouped_fits_reuse_bar_colors() {
    let table = grouped_table();
    let fit = TrendFit::new(vec![
        FitRow::new(TimePoint::Numeric(1), 1.0, 0.5, 1.5).with_group("b"),
        FitRow::new(TimePoint::Numeric(1), 1.0, 0.5, 1.5).with_group("a"),
        FitRow::new(TimePoint::Numeric(2), 1.0, 0.5, 1.5).with_group("a"),
    ]);
    let spec = ChartBuilder::new(&table)
        .with_fits(vec![fit.clone(), fit])
        .build()
        .expect("build")
        .spec;

    let lines = &spec.trend_layer().expect("trend").lines;
    assert_eq!(lines.len(), 12);
    let palette = qualitative_colors(2);
    assert_eq!(lines[0].group.as_deref(), Some("b"));
    assert_eq!(lines[0].color, palette[1]);
    assert_eq!(lines[3].color, palette[0]);
    assert_eq!(lines[6].fit_index, 1);
}

#[test]
fn invalid_fits_report_their_position() {
    let table = daily_table();
    let good = TrendFit::new(vec![FitRow::new(TimePoint::Numeric(1), 1.0, 0.5, 1.5)]);
    let inverted = TrendFit::new(vec![FitRow::new(TimePoint::Numeric(1), 1.0, 2.0, 1.5)]);

    let result = ChartBuilder::new(&table)
        .with_fits(vec![good.clone(), inverted])
        .build();
    assert!(matches!(
        result,
        Err(IncidenceError::InvalidFitInput {
            position: Some(1),
            ..
        })
    ));

    let wrong_kind = TrendFit::new(vec![FitRow::new(
        TimePoint::Date(date(2024, 1, 1)),
        1.0,
        0.5,
        1.5,
    )]);
    let result = ChartBuilder::new(&table).with_fits(wrong_kind).build();
    assert!(matches!(
        result,
        Err(IncidenceError::InvalidFitInput { position: None, .. })
    ));

    let empty = ChartBuilder::new(&table).with_fits(TrendFit::default()).build();
    assert!(matches!(empty, Err(IncidenceError::InvalidFitInput { .. })));
}

#[test]
fn chart_spec_survives_json_contract() {
    let table = grouped_table();
    let spec = ChartBuilder::new(&table)
        .with_options(ChartOptions::default().with_show_cases(true))
        .build()
        .expect("build")
        .spec;

    let json = spec.to_json_contract_v1_pretty().expect("serialize");
    let restored = ChartSpec::from_json_compat_str(&json).expect("parse");
    assert_eq!(restored.layers.len(), spec.layers.len());
    assert_eq!(restored.x_axis.breaks, spec.x_axis.breaks);
    assert_eq!(restored.fill_scale.entries.len(), 2);
    assert_relative_eq!(
        restored.fill_scale.entries[1].color.red,
        spec.fill_scale.entries[1].color.red,
        epsilon = 1e-12
    );
    assert_eq!(
        restored.case_tile_layer().expect("tiles").tiles.len(),
        spec.case_tile_layer().expect("tiles").tiles.len()
    );

    let bare = serde_json::to_string(&spec).expect("bare json");
    let restored_bare = ChartSpec::from_json_compat_str(&bare).expect("parse bare");
    assert_eq!(restored_bare.y_axis.breaks, spec.y_axis.breaks);

    let future = json.replace("\"schema_version\": 1", "\"schema_version\": 2");
    assert!(ChartSpec::from_json_compat_str(&future).is_err());
}

#[test]
fn inconsistent_table_fails_to_build_instead_of_panicking() {
    let mut payload = serde_json::to_value(daily_table()).expect("value");
    payload["counts"][1] = serde_json::json!([3, 5]);
    let table: IncidenceTable = serde_json::from_value(payload).expect("plain serde skips checks");

    let err = ChartBuilder::new(&table)
        .build()
        .expect_err("ragged table must not build");
    assert!(matches!(err, IncidenceError::InvalidData(_)));
}

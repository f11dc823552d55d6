use chrono::{Duration, NaiveDate};
use incidence_rs::api::{ChartBuilder, ChartOptions};
use incidence_rs::core::{AggregationConfig, EventDates, IncidenceAggregator};
use incidence_rs::render::BarLayout;
use proptest::prelude::*;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date")
}

proptest! {
    #[test]
    fn numeric_counts_sum_to_retained_events(
        values in prop::collection::vec(-500i64..500, 1..200),
        interval in 1i64..30
    ) {
        let table = IncidenceAggregator::new(AggregationConfig::default().with_interval(interval))
            .aggregate(&EventDates::integers(values.iter().copied()), None)
            .expect("aggregate")
            .table;

        prop_assert_eq!(table.n(), values.len() as u64);
        prop_assert_eq!(table.totals().iter().sum::<u64>(), values.len() as u64);
        prop_assert_eq!(table.widths().len(), table.bucket_count());
        prop_assert!(table.widths().iter().all(|w| *w == interval as f64));

        let boundaries = table.boundaries();
        prop_assert_eq!(boundaries.len(), table.bucket_count() + 1);
        prop_assert!(boundaries.windows(2).all(|pair| pair[1] - pair[0] == interval));
        let min = *values.iter().min().expect("non-empty");
        let max = *values.iter().max().expect("non-empty");
        prop_assert_eq!(boundaries[0], min);
        prop_assert!(*boundaries.last().expect("boundary") > max);
    }

    #[test]
    fn calendar_buckets_are_contiguous_for_every_unit(
        offsets in prop::collection::vec(0i64..1_500, 1..120),
        unit in prop::sample::select(vec!["week", "month", "quarter", "year"]),
        standard in any::<bool>()
    ) {
        let dates: Vec<NaiveDate> = offsets
            .iter()
            .map(|offset| base_date() + Duration::days(*offset))
            .collect();
        let config = AggregationConfig::default()
            .with_interval(unit)
            .with_standard(standard);
        let table = IncidenceAggregator::new(config)
            .aggregate(&EventDates::dates(dates.iter().copied()), None)
            .expect("aggregate")
            .table;

        prop_assert_eq!(table.n(), dates.len() as u64);
        let boundaries = table.boundaries();
        prop_assert!(boundaries.windows(2).all(|pair| pair[1] > pair[0]));
        let widths = table.widths();
        prop_assert_eq!(widths.len(), table.bucket_count());
        let covered: f64 = widths.iter().sum();
        let span = (boundaries[boundaries.len() - 1] - boundaries[0]) as f64;
        prop_assert!((covered - span).abs() < 1e-9);
        prop_assert_eq!(table.isoweeks().is_some(), standard && unit == "week");
    }

    #[test]
    fn grouped_columns_partition_every_bucket(
        events in prop::collection::vec((0i64..60, prop::option::of(0u8..4)), 1..150)
    ) {
        let groups: Vec<Option<String>> = events
            .iter()
            .map(|(_, group)| group.map(|g| format!("g{g}")))
            .collect();
        let aggregation = IncidenceAggregator::default()
            .aggregate(
                &EventDates::integers(events.iter().map(|(day, _)| *day)),
                Some(&groups),
            )
            .expect("aggregate");
        let table = aggregation.table;

        prop_assert_eq!(table.n(), events.len() as u64);
        prop_assert!(table.counts().iter().all(|row| row.len() == table.group_names().len()));
        prop_assert_eq!(table.group_totals().iter().sum::<u64>(), events.len() as u64);

        let pooled = table.pool().expect("pool");
        prop_assert_eq!(pooled.totals(), table.totals());
        let cumulative = table.cumulate().expect("cumulate");
        prop_assert_eq!(cumulative.counts().last().cloned(), Some(table.group_totals()));
    }

    #[test]
    fn stacked_bars_never_exceed_the_y_domain(
        events in prop::collection::vec((0i64..40, 0u8..3), 1..120),
        dodge in any::<bool>()
    ) {
        let groups: Vec<Option<String>> = events
            .iter()
            .map(|(_, group)| Some(format!("g{group}")))
            .collect();
        let table = IncidenceAggregator::default()
            .aggregate(
                &EventDates::integers(events.iter().map(|(day, _)| *day)),
                Some(&groups),
            )
            .expect("aggregate")
            .table;
        let layout = if dodge { BarLayout::Dodge } else { BarLayout::Stack };
        let options = ChartOptions::default()
            .with_layout(layout)
            .with_show_cases(!dodge);
        let built = ChartBuilder::new(&table)
            .with_options(options)
            .build()
            .expect("build");

        let (_, y_max) = built.spec.y_axis.domain;
        let bars = &built.spec.bar_layer().expect("bars").bars;
        prop_assert!(bars.iter().all(|bar| bar.y_max <= y_max));
        let drawn: f64 = bars.iter().map(|bar| bar.height()).sum();
        prop_assert!((drawn - events.len() as f64).abs() < 1e-9);
        if let Some(tiles) = built.spec.case_tile_layer() {
            prop_assert_eq!(tiles.tiles.len(), events.len());
        }
    }
}

//! Chart composition on top of aggregated incidence tables.

mod axis_labels;
mod axis_ticks;
mod chart_builder;
mod chart_options;
mod fill_resolver;
mod json_contract;
mod trend_overlay;

pub use axis_labels::{default_x_title, default_y_title};
pub use chart_builder::{BuiltChart, ChartBuilder};
pub use chart_options::{ChartOptions, ColorSpec};
pub use json_contract::{
    CHART_SPEC_JSON_SCHEMA_V1, ChartSpecJsonContractV1, INCIDENCE_TABLE_JSON_SCHEMA_V1,
    IncidenceTableJsonContractV1,
};
pub use trend_overlay::{FitOverlay, FitRow, TrendFit};

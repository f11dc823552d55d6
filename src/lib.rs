//! incidence-rs: epidemic incidence aggregation and chart description.
//!
//! `core` bins dated events into contiguous buckets (optionally by group) and
//! derives tables from them; `api` turns a table into a declarative
//! `render::ChartSpec` that any plotting backend can draw.

pub mod api;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod render;
pub mod telemetry;

pub use api::{BuiltChart, ChartBuilder, ChartOptions, ColorSpec, FitOverlay, FitRow, TrendFit};
pub use crate::core::{
    Aggregation, AggregationConfig, EventDates, IncidenceAggregator, IncidenceTable, Interval,
    IntervalSpec, TimeKind, TimePoint,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{IncidenceError, IncidenceResult};

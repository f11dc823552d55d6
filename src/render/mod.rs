mod chart_spec;
mod layer_stack;
mod palette;
mod primitives;

pub use chart_spec::{
    AxisBreak, BarLayer, BarLayout, BarRect, CalendarStep, CaseTileLayer, ChartLayer, ChartSpec,
    FillScale, LegendEntry, StepUnit, TrendLayer, TrendLine, TrendRole, XAxisSpec, YAxisSpec,
};
pub use layer_stack::ChartLayerKind;
pub use palette::{PaletteFn, default_palette, qualitative_colors};
pub use primitives::{Color, LineStrokeStyle};

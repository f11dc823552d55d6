use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{IncidenceError, IncidenceResult};
use crate::render::{BarLayout, Color};

/// Caller-specified bar fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpec {
    /// One color for an ungrouped (or single-group) chart.
    Single(Color),
    /// One color per group, in column order.
    ByPosition(Vec<Color>),
    /// Colors keyed by group name.
    ByName(IndexMap<String, Color>),
}

/// Rendering options for `ChartBuilder`.
///
/// Serializable so host applications can persist chart setup; the palette
/// function is supplied separately because closures cannot be serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub layout: BarLayout,
    pub color: Option<ColorSpec>,
    pub border: Option<Color>,
    pub alpha: f64,
    pub show_cases: bool,
    /// Target number of x-axis breaks; a hint, not an exact count.
    pub n_breaks: usize,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub iso_week_labels: bool,
    pub fit_color: Color,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            layout: BarLayout::Stack,
            color: None,
            border: None,
            alpha: 0.7,
            show_cases: false,
            n_breaks: 6,
            x_title: None,
            y_title: None,
            iso_week_labels: true,
            fit_color: Color::rgb(0.2, 0.2, 0.2),
        }
    }
}

impl ChartOptions {
    #[must_use]
    pub fn with_layout(mut self, layout: BarLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: ColorSpec) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_border(mut self, border: Color) -> Self {
        self.border = Some(border);
        self
    }

    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    #[must_use]
    pub fn with_show_cases(mut self, show_cases: bool) -> Self {
        self.show_cases = show_cases;
        self
    }

    #[must_use]
    pub fn with_n_breaks(mut self, n_breaks: usize) -> Self {
        self.n_breaks = n_breaks;
        self
    }

    #[must_use]
    pub fn with_x_title(mut self, title: impl Into<String>) -> Self {
        self.x_title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_y_title(mut self, title: impl Into<String>) -> Self {
        self.y_title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_iso_week_labels(mut self, enabled: bool) -> Self {
        self.iso_week_labels = enabled;
        self
    }

    #[must_use]
    pub fn with_fit_color(mut self, color: Color) -> Self {
        self.fit_color = color;
        self
    }

    pub fn validate(&self) -> IncidenceResult<()> {
        if !self.alpha.is_finite() || !(0.0..=1.0).contains(&self.alpha) {
            return Err(IncidenceError::InvalidData(
                "alpha must be finite and in [0, 1]".to_owned(),
            ));
        }
        if self.n_breaks == 0 {
            return Err(IncidenceError::InvalidData(
                "n_breaks must be > 0".to_owned(),
            ));
        }
        if let Some(border) = self.border {
            border.validate()?;
        }
        self.fit_color.validate()?;
        match &self.color {
            None => Ok(()),
            Some(ColorSpec::Single(color)) => color.validate(),
            Some(ColorSpec::ByPosition(colors)) => colors.iter().try_for_each(|c| c.validate()),
            Some(ColorSpec::ByName(colors)) => colors.values().try_for_each(|c| c.validate()),
        }
    }
}

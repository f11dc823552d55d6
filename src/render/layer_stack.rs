use serde::{Deserialize, Serialize};

/// Drawing order of chart layers, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChartLayerKind {
    Bars,
    CaseTiles,
    Trend,
}

impl ChartLayerKind {
    #[must_use]
    pub fn canonical_order() -> [Self; 3] {
        [Self::Bars, Self::CaseTiles, Self::Trend]
    }

    #[must_use]
    pub fn z_index(self) -> usize {
        Self::canonical_order()
            .iter()
            .position(|kind| *kind == self)
            .unwrap_or(usize::MAX)
    }
}

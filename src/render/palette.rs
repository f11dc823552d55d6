use std::sync::Arc;

use super::Color;

/// Generates `n` fill colors, one per group.
pub type PaletteFn = Arc<dyn Fn(usize) -> Vec<Color> + Send + Sync>;

const QUALITATIVE_BASE: [(u8, u8, u8); 10] = [
    (0x4e, 0x79, 0xa7),
    (0xf2, 0x8e, 0x2b),
    (0xe1, 0x57, 0x59),
    (0x76, 0xb7, 0xb2),
    (0x59, 0xa1, 0x4f),
    (0xed, 0xc9, 0x48),
    (0xb0, 0x7a, 0xa1),
    (0xff, 0x9d, 0xa7),
    (0x9c, 0x75, 0x5f),
    (0xba, 0xb0, 0xac),
];

/// Distinct qualitative colors; past ten the base cycle is lightened per lap.
#[must_use]
pub fn qualitative_colors(count: usize) -> Vec<Color> {
    (0..count)
        .map(|index| {
            let (r, g, b) = QUALITATIVE_BASE[index % QUALITATIVE_BASE.len()];
            let lap = (index / QUALITATIVE_BASE.len()) as f64;
            let tint = (lap * 0.2).min(0.8);
            let channel = |value: u8| {
                let base = f64::from(value) / 255.0;
                base + (1.0 - base) * tint
            };
            Color::rgb(channel(r), channel(g), channel(b))
        })
        .collect()
}

#[must_use]
pub fn default_palette() -> PaletteFn {
    Arc::new(qualitative_colors)
}

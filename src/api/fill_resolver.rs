use tracing::trace;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{IncidenceError, IncidenceResult};
use crate::render::{Color, PaletteFn};

use super::ColorSpec;

/// Draws `count` colors from the palette, rejecting palettes that come up short.
pub(super) fn palette_colors(palette: &PaletteFn, count: usize) -> IncidenceResult<Vec<Color>> {
    let mut colors = palette(count);
    if colors.len() < count {
        return Err(IncidenceError::InvalidData(format!(
            "palette produced {} colors for {count} groups",
            colors.len()
        )));
    }
    colors.truncate(count);
    Ok(colors)
}

/// Resolves one fill per count column.
///
/// Recoverable mismatches fall back to the palette with a diagnostic; only a
/// palette that cannot cover the columns is an error.
pub(super) fn resolve_fills(
    group_names: &[String],
    column_count: usize,
    spec: Option<&ColorSpec>,
    palette: &PaletteFn,
    diagnostics: &mut Diagnostics,
) -> IncidenceResult<Vec<Color>> {
    let resolved = match spec {
        None => None,
        Some(ColorSpec::Single(color)) if column_count == 1 => Some(vec![*color]),
        Some(ColorSpec::Single(_)) => {
            report_count_mismatch(1, column_count, diagnostics);
            None
        }
        Some(ColorSpec::ByPosition(colors)) if colors.len() == column_count => Some(colors.clone()),
        Some(ColorSpec::ByPosition(colors)) => {
            report_count_mismatch(colors.len(), column_count, diagnostics);
            None
        }
        Some(ColorSpec::ByName(colors)) => {
            let unmatched: Vec<&str> = colors
                .keys()
                .filter(|name| !group_names.contains(*name))
                .map(String::as_str)
                .collect();
            if !unmatched.is_empty() {
                diagnostics.report(
                    DiagnosticKind::UnmatchedColorNames,
                    format!(
                        "colors for unknown groups were ignored: {}",
                        unmatched.join(", ")
                    ),
                );
            }

            let by_group: Option<Vec<Color>> = group_names
                .iter()
                .map(|name| colors.get(name).copied())
                .collect();
            match by_group {
                Some(fills) if fills.len() == column_count => Some(fills),
                _ => {
                    let uncolored: Vec<&str> = group_names
                        .iter()
                        .filter(|name| !colors.contains_key(*name))
                        .map(String::as_str)
                        .collect();
                    diagnostics.report(
                        DiagnosticKind::UncoloredGroups,
                        format!(
                            "no color given for group(s) [{}]; using the palette instead",
                            uncolored.join(", ")
                        ),
                    );
                    None
                }
            }
        }
    };

    match resolved {
        Some(fills) => Ok(fills),
        None => {
            trace!(column_count, "filling groups from palette");
            palette_colors(palette, column_count)
        }
    }
}

fn report_count_mismatch(colors: usize, groups: usize, diagnostics: &mut Diagnostics) {
    diagnostics.report(
        DiagnosticKind::ColorCountMismatch,
        format!("{colors} color(s) supplied for {groups} group(s); using the palette instead"),
    );
}

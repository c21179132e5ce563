//! Color utilities for CLI output
//!
//! Consistent styling for host state in tables and summaries.

use comfy_table::{Cell, Color};
use console::{Style, StyledObject};

/// Table cell for an enabled flag
///
/// - enabled -> green "yes"
/// - disabled -> red "no"
pub fn enabled_cell(enabled: bool) -> Cell {
    if enabled {
        Cell::new("yes").fg(Color::Green)
    } else {
        Cell::new("no").fg(Color::Red)
    }
}

/// Style a count that signals trouble when non-zero
pub fn failure_count_style(count: usize) -> StyledObject<usize> {
    let style = if count == 0 {
        Style::new().dim()
    } else {
        Style::new().yellow()
    };
    style.apply_to(count)
}

//! Output utilities for CLI commands
//!
//! Terminal helpers: spinners for file rewrites, a progress bar driven by
//! probe events, and consistent colors for host state.

pub mod colors;
pub mod progress;
pub mod spinner;

pub use colors::{enabled_cell, failure_count_style};
pub use progress::ProbeProgress;
pub use spinner::CommandSpinner;

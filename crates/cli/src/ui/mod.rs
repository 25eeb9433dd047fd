//! Terminal output for hookline
//!
//! - Status markers for one-line command feedback
//! - The dotted per-hook report printed by `run`

pub mod icons;
pub mod report;

pub use icons::{Icons, StatusIcon};
pub use report::{LINE_WIDTH, render_report, status_line};

/// Output format for `run` and `list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human readable, coloured when stdout is a terminal
    #[default]
    Simple,
    /// Machine readable JSON
    Json,
}

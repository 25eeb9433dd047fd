//! The per-hook report
//!
//! One dotted line per hook, followed by details and captured output for
//! hooks that failed or asked to be verbose:
//!
//! ```text
//! flake8...................................................................Failed
//! - hook id: flake8
//! - exit code: 1
//!
//! src/etl.py:1:1: F401 'os' imported but unused
//!
//! black................................................(no files to check)Skipped
//! ```

use hookline_engine::{HookStatus, RunReport, RunResult};
use owo_colors::OwoColorize;
use std::fmt::Write as _;

/// Width of a status line
pub const LINE_WIDTH: usize = 79;

/// Fewest dots between a name and its status
const MIN_DOTS: usize = 3;

/// `name`, padded with dots so `label` ends at column `width`
#[must_use]
pub fn status_line(name: &str, label: &str, width: usize) -> String {
    let used = name.chars().count() + label.chars().count();
    let dots = width.saturating_sub(used).max(MIN_DOTS);
    format!("{name}{}{label}", ".".repeat(dots))
}

fn paint_status(status: HookStatus, color: bool) -> String {
    let label = status.label();
    if !color {
        return label.to_string();
    }
    match status {
        HookStatus::Passed => label.on_green().to_string(),
        HookStatus::Failed | HookStatus::Error => label.on_red().to_string(),
        HookStatus::Skipped => label.black().on_yellow().to_string(),
        HookStatus::NoFiles => label.black().on_cyan().to_string(),
    }
}

fn render_result(out: &mut String, result: &RunResult, color: bool) {
    // Pad on the plain label so escape codes do not skew the dots
    let plain = status_line(&result.name, result.status.label(), LINE_WIDTH);
    let dotted = &plain[..plain.len() - result.status.label().len()];
    let _ = writeln!(out, "{dotted}{}", paint_status(result.status, color));

    let failed = result.status.is_failure();
    if !failed && !result.verbose {
        return;
    }
    if matches!(result.status, HookStatus::Skipped | HookStatus::NoFiles) {
        return;
    }

    let mut details = vec![format!("- hook id: {}", result.hook_id)];
    if result.verbose {
        details.push(format!("- duration: {:.2}s", result.duration.as_secs_f64()));
    }
    if let Some(code) = result.exit_code.filter(|code| *code != 0) {
        details.push(format!("- exit code: {code}"));
    }
    if !result.modified_files.is_empty() {
        details.push("- files were modified by this hook".to_string());
    }
    for line in details {
        if color {
            let _ = writeln!(out, "{}", line.dimmed());
        } else {
            let _ = writeln!(out, "{line}");
        }
    }

    if result.shows_output() {
        let _ = write!(out, "\n{}\n\n", result.output.trim_end());
    }
}

/// Render a whole run
#[must_use]
pub fn render_report(report: &RunReport, color: bool) -> String {
    let mut out = String::new();
    for result in &report.results {
        render_result(&mut out, result, color);
    }

    if report.stopped_early {
        let note = "Stopped at the first failure (fail_fast)";
        if color {
            let _ = writeln!(out, "{}", note.yellow());
        } else {
            let _ = writeln!(out, "{note}");
        }
    }
    out
}

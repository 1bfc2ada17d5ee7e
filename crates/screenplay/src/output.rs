//! Output formatting: table or JSON.
//!
//! Table uses `tabled`, JSON serializes the same report via serde. Status
//! words are colored with `owo-colors` when color is enabled.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Resolved presentation settings for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct Presentation {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Color a status word: green for success-like words, yellow for refusals,
/// red for failures.
pub fn status(word: &str, color: bool) -> String {
    if !color {
        return word.to_owned();
    }
    match word {
        "executed" | "active" | "chosen" => word.green().to_string(),
        "refused" | "deactivated" | "dismissed" => word.yellow().to_string(),
        "faulted" | "disposed" => word.red().to_string(),
        _ => word.dimmed().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a report: rows as a table followed by a summary line, or the
/// whole report as JSON.
pub fn render_report<T, R>(
    presentation: &Presentation,
    report: &T,
    rows: &[R],
    summary: &str,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match presentation.format {
        OutputFormat::Table => {
            let table = Table::new(rows).with(Style::rounded()).to_string();
            let summary = if presentation.color {
                summary.bold().to_string()
            } else {
                summary.to_owned()
            };
            Ok(format!("{table}\n{summary}"))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

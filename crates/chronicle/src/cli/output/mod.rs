//! Terminal output
//!
//! Status lines go to stderr so stdout carries only the rendered changelog
//! (or the JSON document with `--format json`).

use std::fmt::Display;
use std::path::Path;

use console::style;

/// Print a success line
pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

/// Print an error line
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning line
pub fn warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Print an informational line
pub fn info(message: &str) {
    eprintln!("{} {}", style("→").blue(), message);
}

/// Bold title line
pub fn title(text: impl Display) -> String {
    style(text).bold().to_string()
}

/// Indented `label: value` line
pub fn field(label: &str, value: impl Display) -> String {
    format!("  {}: {}", style(label).dim(), value)
}

/// A tag, ref or range
pub fn tag(value: impl Display) -> String {
    style(value).yellow().to_string()
}

/// A filesystem path
pub fn path(value: &Path) -> String {
    style(value.display()).cyan().to_string()
}

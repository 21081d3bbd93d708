//! Output formatting utilities

use colored::Colorize;

/// Width of a full (100 %) bar in the chart
pub(crate) const BAR_WIDTH: usize = 40;

/// Print a section header
pub(crate) fn section(title: &str) {
    println!("\n{}", format!("=== {title} ===").cyan().bold());
}

/// Print a key-value pair
pub(crate) fn kv(key: &str, value: impl std::fmt::Display) {
    println!("  {}: {}", key.white().bold(), value);
}

/// Print a warning message
pub(crate) fn warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// Print an info message
pub(crate) fn info(msg: &str) {
    println!("{} {}", "[INFO]".blue(), msg);
}

/// Print an error message
pub(crate) fn error(msg: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), msg);
}

/// Horizontal bar chart lines, one per `(label, percent)` entry.
///
/// Labels are padded to the longest one; bar length is proportional to the
/// percentage.
pub(crate) fn bar_chart(entries: &[(&str, f64)], width: usize) -> Vec<String> {
    let label_width = entries
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    entries
        .iter()
        .map(|(label, percent)| {
            let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
            format!(
                "  {label:<label_width$} | {}{} {percent:6.2}%",
                "█".repeat(filled),
                " ".repeat(width - filled),
            )
        })
        .collect()
}

/// Print a bar chart
pub(crate) fn chart(entries: &[(&str, f64)]) {
    for line in bar_chart(entries, BAR_WIDTH) {
        println!("{}", line.green());
    }
}

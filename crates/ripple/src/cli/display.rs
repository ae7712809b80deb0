//! Common display utilities for CLI commands.

use colored::{ColoredString, Colorize};
use ripple::ImpactLevel;

const MAX_DISPLAY_ITEMS: usize = 10;

/// Display a list of paths with optional truncation.
///
/// Shows up to `MAX_DISPLAY_ITEMS` paths with bullet points. If there are more,
/// shows "... and N more". If empty, shows the provided `empty_message`.
pub fn print_paths(paths: &[String], empty_message: &str) {
    if paths.is_empty() {
        println!("    {}", empty_message.dimmed());
        return;
    }

    for path in paths.iter().take(MAX_DISPLAY_ITEMS) {
        println!("    {} {path}", "•".dimmed());
    }

    if paths.len() > MAX_DISPLAY_ITEMS {
        println!(
            "    {} ... and {} more",
            "•".dimmed(),
            paths.len() - MAX_DISPLAY_ITEMS
        );
    }
}

/// Color an impact level label by severity.
pub fn level_label(level: ImpactLevel) -> ColoredString {
    let label = format!("{level:<8}");
    match level {
        ImpactLevel::Critical => label.red().bold(),
        ImpactLevel::High => label.yellow().bold(),
        ImpactLevel::Medium => label.yellow(),
        ImpactLevel::Low => label.blue(),
    }
}

/// Color a risk score by tier.
pub fn risk_label(score: f64) -> ColoredString {
    let text = format!("{score:.1}/10");
    if score >= 7.0 {
        text.red().bold()
    } else if score >= 4.0 {
        text.yellow().bold()
    } else {
        text.green()
    }
}

/// Render a cycle as `a → b → c`.
pub fn cycle_path(members: &[String]) -> String {
    members.join(" → ")
}

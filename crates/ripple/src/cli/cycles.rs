//! `ripple cycles` command implementation.

use colored::Colorize;
use ripple::ImpactEngine;

use super::display::cycle_path;

/// Run the cycles command.
pub fn run(engine: &ImpactEngine) -> Result<(), ripple::Error> {
    let groups = engine.store().cycle_groups();

    if groups.is_empty() {
        println!("{}", "No circular dependencies detected.".green());
        return Ok(());
    }

    println!(
        "Found {} groups of circular dependencies:",
        groups.len().to_string().red().bold()
    );
    println!();

    for (i, group) in groups.iter().enumerate() {
        println!(
            "  {} {} ({} files):",
            "Cycle".yellow().bold(),
            i + 1,
            group.len()
        );

        // Close the loop on the first member
        let mut path = group.clone();
        if let Some(first) = group.first() {
            path.push(first.clone());
        }
        println!("    {}", cycle_path(&path).dimmed());
    }

    Ok(())
}

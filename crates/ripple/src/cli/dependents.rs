//! `ripple dependents` command implementation.

use colored::Colorize;
use ripple::{FileNameSuggester, ImpactEngine, SuggestionProvider, normalize_target};

use super::display::print_paths;

/// Run the dependents command.
pub fn run(engine: &ImpactEngine, node: &str) -> Result<(), ripple::Error> {
    let node = normalize_target(node)?;
    let snapshot = engine
        .store()
        .snapshot()
        .ok_or(ripple::Error::GraphUnavailable)?;

    if !snapshot.contains(&node) {
        let suggestions = FileNameSuggester::default().suggest(&node, &snapshot);
        return Err(ripple::Error::TargetNotFound {
            target: node,
            suggestions,
        });
    }

    println!("Dependencies of {}:", node.cyan().bold());
    println!();

    let dependents = snapshot.dependents_of(&node);
    println!(
        "  {} ({} files):",
        "Imported by".white().bold(),
        dependents.len().to_string().green()
    );
    print_paths(dependents, "(none)");
    println!();

    let dependencies = snapshot.dependencies_of(&node);
    println!(
        "  {} ({} files):",
        "Imports".white().bold(),
        dependencies.len().to_string().green()
    );
    print_paths(dependencies, "(none)");

    Ok(())
}

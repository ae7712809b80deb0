//! `ripple analyze` command implementation.

use colored::Colorize;
use ripple::{AnalysisRequest, ImpactAnalysis, ImpactEngine, ImpactLevel};

use super::display::{cycle_path, level_label, print_paths, risk_label};

/// Run the analyze command.
pub fn run(
    engine: &ImpactEngine,
    target: &str,
    change_type: &str,
    depth: Option<i64>,
    json: bool,
) -> Result<(), ripple::Error> {
    let request = AnalysisRequest {
        target: target.to_string(),
        change_type: change_type.to_string(),
        depth,
    };
    let analysis = engine.analyze_impact(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    print_analysis(&analysis);
    Ok(())
}

fn print_analysis(analysis: &ImpactAnalysis) {
    println!(
        "Impact of {} on {}:",
        analysis.change_type.to_string().magenta(),
        analysis.target.cyan().bold()
    );
    println!();

    println!(
        "  {} {}",
        "Risk score:".white().bold(),
        risk_label(analysis.risk_score)
    );
    println!(
        "  {} {} files within {} hops",
        "Impacted:".white().bold(),
        analysis.impacted_files.len().to_string().green(),
        analysis.metadata.depth
    );
    if analysis.metadata.truncated {
        println!(
            "  {}: traversal stopped early, results are partial",
            "warning".yellow()
        );
    }
    println!();

    for level in [
        ImpactLevel::Critical,
        ImpactLevel::High,
        ImpactLevel::Medium,
        ImpactLevel::Low,
    ] {
        let paths: Vec<String> = analysis
            .impacted_files
            .iter()
            .filter(|f| f.impact_level == level)
            .map(|f| f.path.clone())
            .collect();
        if paths.is_empty() {
            continue;
        }
        println!("  {} ({} files):", level_label(level), paths.len());
        print_paths(&paths, "(none)");
        println!();
    }

    if !analysis.circular_dependencies.is_empty() {
        println!(
            "  {} ({}):",
            "Circular dependencies".red().bold(),
            analysis.circular_dependencies.len()
        );
        for cycle in &analysis.circular_dependencies {
            println!("    {}", cycle_path(cycle).dimmed());
        }
        println!();
    }

    println!("  {}", "Recommendations:".white().bold());
    for recommendation in &analysis.recommendations {
        println!("    {} {recommendation}", "•".dimmed());
    }
}

//! Ripple CLI - dependency impact analysis from the command line.
//!
//! Reads a dependency graph produced by a scanner and answers questions
//! about the blast radius of changing a file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

/// Ripple: dependency impact analysis.
#[derive(Parser)]
#[command(name = "ripple")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Dependency graph JSON file
    #[arg(short, long, global = true, default_value = "dependency-graph.json")]
    graph: PathBuf,

    /// Engine configuration YAML file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the impact of changing a file
    Analyze {
        /// Workspace-relative path of the changed file
        target: String,

        /// Kind of change (refactor, delete, modify, add-feature)
        #[arg(short = 't', long, default_value = "modify")]
        change_type: String,

        /// Maximum traversal depth (clamped to 1..=5)
        #[arg(short, long)]
        depth: Option<i64>,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// List files that directly depend on a file
    Dependents {
        /// Workspace-relative path of the file
        node: String,
    },

    /// List every group of files caught in an import loop
    Cycles,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let engine = match cli::open_engine(&cli.graph, cli.config.as_deref()) {
        Ok(engine) => engine,
        Err(e) => return report(&e),
    };

    let result = match cli.command {
        Commands::Analyze {
            target,
            change_type,
            depth,
            json,
        } => cli::analyze::run(&engine, &target, &change_type, depth, json),
        Commands::Dependents { node } => cli::dependents::run(&engine, &node),
        Commands::Cycles => cli::cycles::run(&engine),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn report(e: &ripple::Error) -> ExitCode {
    eprintln!("{}: {e}", "error".red().bold());
    // Show cause chain for nested errors
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        eprintln!("  {}: {cause}", "caused by".dimmed());
        source = std::error::Error::source(cause);
    }
    ExitCode::FAILURE
}

//! CLI command implementations.

mod display;

pub mod analyze;
pub mod cycles;
pub mod dependents;

use std::path::Path;

use ripple::{EngineConfig, ImpactEngine, JsonFileProvider};
use tracing::debug;

/// Build an engine from an optional config file and load the graph file.
pub fn open_engine(graph: &Path, config: Option<&Path>) -> Result<ImpactEngine, ripple::Error> {
    let mut config = match config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    // One-shot process: nothing lives long enough to need sweeping.
    config.cache.sweep_interval_secs = 0;

    let engine = ImpactEngine::new(config);
    let snapshot = engine.load_from(&JsonFileProvider::new(graph))?;
    debug!(
        nodes = snapshot.node_count(),
        dangling_edges = snapshot.dangling_edges(),
        "Graph ready"
    );
    Ok(engine)
}

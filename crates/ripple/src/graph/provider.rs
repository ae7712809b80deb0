//! Sources of dependency graphs.
//!
//! Building a graph (scanning sources, resolving imports) happens elsewhere.
//! Ripple only consumes the result through [`GraphProvider`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::types::Graph;

/// Something that can produce a dependency graph.
pub trait GraphProvider: Send + Sync {
    /// Produce the current graph.
    ///
    /// # Errors
    ///
    /// Whatever prevented the graph from being read, typically
    /// [`Error::Io`](crate::Error::Io) or [`Error::Json`](crate::Error::Json).
    fn provide(&self) -> Result<Graph>;
}

/// Reads a graph from a JSON file of the form
/// `{"nodes": [{"id", "path", "label"}], "edges": [{"source", "target"}], "metadata": {..}}`.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    /// Create a provider for the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this provider reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GraphProvider for JsonFileProvider {
    fn provide(&self) -> Result<Graph> {
        debug!(path = %self.path.display(), "Reading dependency graph");
        let content = fs::read_to_string(&self.path)?;
        let graph: Graph = serde_json::from_str(&content)?;
        Ok(graph)
    }
}

/// Hands out a fixed graph. Useful for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    graph: Graph,
}

impl StaticProvider {
    /// Wrap `graph`.
    #[must_use]
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }
}

impl GraphProvider for StaticProvider {
    fn provide(&self) -> Result<Graph> {
        Ok(self.graph.clone())
    }
}

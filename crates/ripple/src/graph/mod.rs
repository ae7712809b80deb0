//! Graph storage for dependency analysis.
//!
//! This module provides:
//! - [`GraphStore`]: the single owner of the current graph and its indexes
//! - [`GraphSnapshot`]: an immutable, indexed view handed to the traversal
//! - [`GraphProvider`]: the collaborator that produces graphs (scan or file)
//!
//! ## Design
//!
//! - A load builds a complete new snapshot first and then swaps it in, so a
//!   reader never sees a half-rebuilt index
//! - Snapshots are shared through `Arc`; an analysis holds one for its whole
//!   duration and is unaffected by concurrent reloads
//! - Dangling edges are skipped and logged, never fatal

mod cycles;
mod index;
mod provider;

pub use index::AdjacencyIndex;
pub use provider::{GraphProvider, JsonFileProvider, StaticProvider};

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::types::{Graph, Node};
use index::EdgeIndexes;

/// An immutable, fully indexed dependency graph.
#[derive(Debug)]
pub struct GraphSnapshot {
    graph: Graph,
    positions: HashMap<String, usize>,
    reverse: AdjacencyIndex,
    forward: AdjacencyIndex,
    dangling_edges: usize,
}

impl GraphSnapshot {
    /// Index `graph`, dropping repeated node ids (first occurrence wins).
    #[must_use]
    pub fn build(mut graph: Graph) -> Self {
        let mut seen = HashSet::new();
        let before = graph.nodes.len();
        graph.nodes.retain(|node| seen.insert(node.id.clone()));
        if graph.nodes.len() != before {
            debug!(
                dropped = before - graph.nodes.len(),
                "Dropped nodes with duplicate ids"
            );
        }

        let positions = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();

        let known: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        let EdgeIndexes {
            reverse,
            forward,
            dangling,
        } = EdgeIndexes::build(&graph.edges, &known);

        Self {
            graph,
            positions,
            reverse,
            forward,
            dangling_edges: dangling,
        }
    }

    /// The underlying graph.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.positions.get(id).map(|&i| &self.graph.nodes[i])
    }

    /// Whether `id` is a node of this graph.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Nodes that import `id`, in edge order.
    #[must_use]
    pub fn dependents_of(&self, id: &str) -> &[String] {
        self.reverse.get(id)
    }

    /// Nodes that `id` imports, in edge order.
    #[must_use]
    pub fn dependencies_of(&self, id: &str) -> &[String] {
        self.forward.get(id)
    }

    /// The reverse-dependency index.
    #[must_use]
    pub fn reverse_index(&self) -> &AdjacencyIndex {
        &self.reverse
    }

    /// Number of nodes after de-duplication.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.nodes.len()
    }

    /// Number of edges skipped because an endpoint was unknown.
    #[must_use]
    pub fn dangling_edges(&self) -> usize {
        self.dangling_edges
    }

    /// Coarse graph version used in cache keys.
    ///
    /// This is the node count, so edits that keep the count stable are not
    /// detected. The engine clears its cache on every load to compensate.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.graph.nodes.len() as u64
    }

    /// Strongly connected groups of files, see [`GraphStore::cycle_groups`].
    #[must_use]
    pub fn cycle_groups(&self) -> Vec<Vec<String>> {
        cycles::cycle_groups(self)
    }
}

/// Owner of the current dependency graph.
///
/// Holds at most one graph. Every [`load`](Self::load) fully replaces the
/// previous graph and its indexes; nothing is merged.
#[derive(Debug, Default)]
pub struct GraphStore {
    current: RwLock<Option<Arc<GraphSnapshot>>>,
}

impl GraphStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current graph, rebuilding all indexes.
    ///
    /// Returns the new snapshot.
    pub fn load(&self, graph: Graph) -> Arc<GraphSnapshot> {
        let snapshot = Arc::new(GraphSnapshot::build(graph));

        info!(
            nodes = snapshot.node_count(),
            edges = snapshot.graph.edges.len(),
            indexed_targets = snapshot.reverse.len(),
            dangling_edges = snapshot.dangling_edges,
            "Dependency graph loaded"
        );

        // Snapshots are swapped whole, so a poisoned lock still guards a
        // consistent value.
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Drop the current graph.
    pub fn clear(&self) {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
        debug!("Dependency graph cleared");
    }

    /// The current snapshot, if a graph is loaded.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<GraphSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// A copy of the current graph, if one is loaded.
    #[must_use]
    pub fn current(&self) -> Option<Graph> {
        self.snapshot().map(|s| s.graph.clone())
    }

    /// Whether a graph is loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Files that directly depend on `node_id`.
    ///
    /// Empty when the node is unknown or no graph is loaded.
    #[must_use]
    pub fn dependents_of(&self, node_id: &str) -> Vec<String> {
        self.snapshot()
            .map(|s| s.dependents_of(node_id).to_vec())
            .unwrap_or_default()
    }

    /// Files that `node_id` directly depends on.
    ///
    /// Empty when the node is unknown or no graph is loaded.
    #[must_use]
    pub fn dependencies_of(&self, node_id: &str) -> Vec<String> {
        self.snapshot()
            .map(|s| s.dependencies_of(node_id).to_vec())
            .unwrap_or_default()
    }

    /// Every group of files that depend on each other in a loop.
    ///
    /// Each group is sorted, and groups are sorted by their first member.
    /// Self-imports count as a group of one. Empty when no graph is loaded.
    #[must_use]
    pub fn cycle_groups(&self) -> Vec<Vec<String>> {
        self.snapshot()
            .map(|s| s.cycle_groups())
            .unwrap_or_default()
    }
}

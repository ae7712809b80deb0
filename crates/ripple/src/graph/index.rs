//! Adjacency indexes derived from a graph's edge list.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::types::Edge;

/// Mapping from a node to the distinct nodes on the other end of its edges.
///
/// Lists keep first-seen edge order, which fixes the order in which the
/// traversal explores dependents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyIndex {
    entries: HashMap<String, Vec<String>>,
}

impl AdjacencyIndex {
    /// Neighbors of `node_id`, empty if it has none.
    #[must_use]
    pub fn get(&self, node_id: &str) -> &[String] {
        self.entries
            .get(node_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of keys with at least one neighbor.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no node has any neighbor.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of (key, neighbor) pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Iterate over `(key, neighbors)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    fn push_distinct(&mut self, key: &str, value: &str) {
        let list = self.entries.entry(key.to_string()).or_default();
        if !list.iter().any(|existing| existing == value) {
            list.push(value.to_string());
        }
    }
}

/// Both directions of the edge relation, built in a single pass.
#[derive(Debug, Clone, Default)]
pub(crate) struct EdgeIndexes {
    /// target -> sources that import it.
    pub reverse: AdjacencyIndex,
    /// source -> targets it imports.
    pub forward: AdjacencyIndex,
    /// Edges skipped because an endpoint is not a known node.
    pub dangling: usize,
}

impl EdgeIndexes {
    /// Build both indexes from `edges`, skipping edges whose endpoints are
    /// not in `known`.
    pub fn build(edges: &[Edge], known: &HashSet<&str>) -> Self {
        let mut indexes = Self::default();

        for edge in edges {
            if !known.contains(edge.source.as_str()) || !known.contains(edge.target.as_str()) {
                warn!(
                    importer = %edge.source,
                    imported = %edge.target,
                    "Edge references unknown node, skipping"
                );
                indexes.dangling += 1;
                continue;
            }

            indexes.reverse.push_distinct(&edge.target, &edge.source);
            indexes.forward.push_distinct(&edge.source, &edge.target);
        }

        indexes
    }
}

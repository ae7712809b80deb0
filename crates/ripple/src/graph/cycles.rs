//! Whole-graph cycle detection using petgraph.
//!
//! The traversal only reports cycles it walks through from one target. This
//! answers the broader question: which files are tangled in import loops at
//! all. Tarjan's SCC finds every strongly connected component in O(V + E).

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::GraphSnapshot;

pub(super) fn cycle_groups(snapshot: &GraphSnapshot) -> Vec<Vec<String>> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

    for node in &snapshot.graph().nodes {
        indices.insert(node.id.as_str(), graph.add_node(node.id.as_str()));
    }

    for (target, sources) in snapshot.reverse_index().iter() {
        let Some(&to) = indices.get(target) else {
            continue;
        };
        for source in sources {
            if let Some(&from) = indices.get(source.as_str()) {
                graph.add_edge(from, to, ());
            }
        }
    }

    let mut groups: Vec<Vec<String>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| match component.as_slice() {
            [single] => graph.contains_edge(*single, *single),
            _ => true,
        })
        .map(|component| {
            let mut members: Vec<String> =
                component.into_iter().map(|i| graph[i].to_string()).collect();
            members.sort();
            members
        })
        .collect();

    groups.sort();
    groups
}

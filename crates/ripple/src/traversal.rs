//! Reverse-dependency traversal.
//!
//! Walks "who imports me" edges outward from a changed file, recording how
//! far away each dependent is and every import loop the walk passes through.
//!
//! ## Distances
//!
//! The walk is depth-first and a node's distance is fixed the first time it
//! is discovered. Distances are therefore *discovery-order* distances: they
//! depend on the order of each node's dependents list and are not always the
//! shortest path. A node reachable at distance 2 through one importer may be
//! reported at distance 3 if a longer branch is explored first.
//!
//! ## Guards
//!
//! A walk stops early, keeping what it found so far, when any of these trips:
//!
//! | Guard | Checked |
//! |-------|---------|
//! | node count (`max_nodes`) | every visit |
//! | operation count (`min(max_operations, max_nodes * 10)`) | every visit |
//! | wall-clock budget | every `checkpoint_interval` visits |
//! | cancellation flag | every `checkpoint_interval` visits |
//!
//! The node count guard runs before the cycle check, so once `max_nodes`
//! nodes are known a loop back into the current path trips the limit and is
//! not recorded as a cycle.
//!
//! The walk is synchronous. A caller that stops waiting on it does not stop
//! it; only the cancellation flag does, at the next checkpoint.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::TraversalLimits;
use crate::graph::GraphSnapshot;

/// Shared flag used to ask a running traversal to stop.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Create an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Observed at the traversal's next checkpoint.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Why a traversal stopped before exhausting the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationReason {
    /// `max_nodes` nodes were already discovered.
    NodeLimit,
    /// The operation counter reached its cap.
    OperationLimit,
    /// The wall-clock budget ran out.
    TimeBudget,
    /// The cancellation flag was set.
    Cancelled,
}

impl fmt::Display for TruncationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NodeLimit => "node limit reached",
            Self::OperationLimit => "operation limit reached",
            Self::TimeBudget => "time budget exhausted",
            Self::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// What a traversal found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalOutcome {
    /// Impacted nodes in discovery order. Never contains the target.
    pub discovered: Vec<String>,
    /// Discovery-order distance of each impacted node.
    pub distances: HashMap<String, u32>,
    /// Import loops, each starting and ending on the same node.
    pub cycles: Vec<Vec<String>>,
    /// Set when a guard stopped the walk early.
    pub truncation: Option<TruncationReason>,
    /// Visit operations performed.
    pub operations: usize,
}

impl TraversalOutcome {
    /// Whether the walk stopped early.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.truncation.is_some()
    }

    /// Distance of `node_id`, if it was discovered.
    #[must_use]
    pub fn distance(&self, node_id: &str) -> Option<u32> {
        self.distances.get(node_id).copied()
    }
}

/// A strategy for finding the files impacted by a change.
pub trait Traverse: Send + Sync {
    /// Walk dependents of `target` in `graph` up to `max_depth` hops.
    ///
    /// Never fails: guard trips and cancellation are reported through
    /// [`TraversalOutcome::truncation`].
    fn traverse(
        &self,
        graph: &GraphSnapshot,
        target: &str,
        max_depth: u32,
        cancel: &CancellationFlag,
    ) -> TraversalOutcome;
}

/// Path-sensitive depth-first traversal with cycle recording.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthFirstTraversal {
    limits: TraversalLimits,
}

impl DepthFirstTraversal {
    /// Create a traversal bounded by `limits`.
    #[must_use]
    pub fn new(limits: TraversalLimits) -> Self {
        Self { limits }
    }

    /// The limits this traversal enforces.
    #[must_use]
    pub fn limits(&self) -> &TraversalLimits {
        &self.limits
    }
}

impl Traverse for DepthFirstTraversal {
    fn traverse(
        &self,
        graph: &GraphSnapshot,
        target: &str,
        max_depth: u32,
        cancel: &CancellationFlag,
    ) -> TraversalOutcome {
        let mut walk = Walk {
            graph,
            limits: &self.limits,
            operation_cap: self.limits.operation_cap(),
            max_depth,
            cancel,
            started: Instant::now(),
            current_path: Vec::new(),
            visited: HashSet::new(),
            order: Vec::new(),
            distances: HashMap::new(),
            cycles: Vec::new(),
            operations: 0,
            truncation: None,
        };

        walk.visit(target, 0);

        let Walk {
            mut order,
            mut distances,
            cycles,
            operations,
            truncation,
            started,
            ..
        } = walk;

        order.retain(|id| id != target);
        distances.remove(target);

        if let Some(reason) = truncation {
            warn!(
                origin = target,
                %reason,
                discovered = order.len(),
                operations,
                "Traversal stopped early, returning partial results"
            );
        }
        debug!(
            origin = target,
            max_depth,
            discovered = order.len(),
            cycles = cycles.len(),
            operations,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Traversal finished"
        );

        TraversalOutcome {
            discovered: order,
            distances,
            cycles,
            truncation,
            operations,
        }
    }
}

/// Mutable state of one walk.
struct Walk<'a> {
    graph: &'a GraphSnapshot,
    limits: &'a TraversalLimits,
    operation_cap: usize,
    max_depth: u32,
    cancel: &'a CancellationFlag,
    started: Instant,
    current_path: Vec<String>,
    /// Fully processed nodes. Disjoint from `current_path`.
    visited: HashSet<String>,
    order: Vec<String>,
    distances: HashMap<String, u32>,
    cycles: Vec<Vec<String>>,
    operations: usize,
    truncation: Option<TruncationReason>,
}

impl Walk<'_> {
    fn visit(&mut self, node: &str, distance: u32) {
        if self.truncation.is_some() || !self.tick() {
            return;
        }

        if distance > self.max_depth {
            return;
        }

        if self.distances.len() >= self.limits.max_nodes {
            self.truncation = Some(TruncationReason::NodeLimit);
            return;
        }

        if let Some(start) = self.current_path.iter().position(|n| n == node) {
            self.record_cycle(start, node);
            return;
        }

        if !self.distances.contains_key(node) {
            self.distances.insert(node.to_string(), distance);
            self.order.push(node.to_string());
        }

        self.current_path.push(node.to_string());

        let graph = self.graph;
        for dependent in graph.dependents_of(node) {
            if self.truncation.is_some() {
                break;
            }
            if !self.visited.contains(dependent) {
                self.visit(dependent, distance + 1);
            }
        }

        self.current_path.pop();
        self.visited.insert(node.to_string());
    }

    /// Count one operation and run the periodic checks.
    ///
    /// Returns `false` when a guard tripped.
    fn tick(&mut self) -> bool {
        self.operations += 1;
        if self.operations > self.operation_cap {
            self.operations = self.operation_cap;
            self.truncation = Some(TruncationReason::OperationLimit);
            return false;
        }

        if self.operations % self.limits.checkpoint_interval.max(1) == 0 {
            if self.cancel.is_cancelled() {
                self.truncation = Some(TruncationReason::Cancelled);
                return false;
            }
            if self.started.elapsed() >= self.limits.time_budget() {
                self.truncation = Some(TruncationReason::TimeBudget);
                return false;
            }
        }

        true
    }

    fn record_cycle(&mut self, start: usize, node: &str) {
        if self.cycles.len() >= self.limits.max_cycles {
            return;
        }
        let mut cycle = self.current_path[start..].to_vec();
        cycle.push(node.to_string());
        debug!(cycle = %cycle.join(" -> "), "Circular dependency found");
        self.cycles.push(cycle);
    }
}

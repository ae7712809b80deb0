//! Core data types for Ripple.
//!
//! The wire representation follows the JSON shape produced by the graph
//! scanner (camelCase keys) so graph files and analysis results can be
//! exchanged with other tooling unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A file in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    /// Workspace-relative identifier, unique within a graph.
    pub id: String,
    /// Path of the file on disk.
    pub path: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
}

impl Node {
    /// Create a node whose path and label are derived from its id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let label = id.rsplit('/').next().unwrap_or(&id).to_string();
        Self {
            path: id.clone(),
            label,
            id,
        }
    }
}

/// A dependency edge: `source` depends on (imports) `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// The dependent node id.
    pub source: String,
    /// The dependency node id.
    pub target: String,
}

impl Edge {
    /// Create an edge meaning `source` imports `target`.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Descriptive information attached to a graph by the scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
    /// Workspace root that was scanned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    /// When the scan ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    /// Number of files the scanner saw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<usize>,
    /// Number of import edges the scanner saw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_count: Option<usize>,
}

/// A dependency graph as produced by a scan.
///
/// Node order is preserved from the input; later duplicates of an id are
/// dropped when the graph is loaded into a [`GraphStore`](crate::GraphStore).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    /// Files in the graph.
    pub nodes: Vec<Node>,
    /// Import edges between files.
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Scanner metadata.
    #[serde(default)]
    pub metadata: GraphMetadata,
}

impl Graph {
    /// Build a graph from node ids and `(source, target)` pairs.
    ///
    /// Mostly useful in tests and examples.
    #[must_use]
    pub fn from_pairs(nodes: &[&str], edges: &[(&str, &str)]) -> Self {
        Self {
            nodes: nodes.iter().map(|id| Node::new(*id)).collect(),
            edges: edges.iter().map(|(s, t)| Edge::new(*s, *t)).collect(),
            metadata: GraphMetadata::default(),
        }
    }
}

/// The kind of modification being analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    /// Restructuring without behavior change.
    Refactor,
    /// Removing the file.
    Delete,
    /// Changing behavior.
    Modify,
    /// Adding new functionality.
    AddFeature,
}

impl ChangeType {
    /// All change types, in declaration order.
    pub const ALL: [Self; 4] = [Self::Refactor, Self::Delete, Self::Modify, Self::AddFeature];

    /// Weight applied to the raw risk sum.
    #[must_use]
    pub fn risk_multiplier(self) -> f64 {
        match self {
            Self::Delete => 1.5,
            Self::Refactor => 1.2,
            Self::Modify => 1.0,
            Self::AddFeature => 0.8,
        }
    }

    /// The wire name of this change type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Refactor => "refactor",
            Self::Delete => "delete",
            Self::Modify => "modify",
            Self::AddFeature => "add-feature",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "refactor" => Ok(Self::Refactor),
            "delete" => Ok(Self::Delete),
            "modify" => Ok(Self::Modify),
            "add-feature" | "add_feature" => Ok(Self::AddFeature),
            _ => Err(Error::InvalidChangeType {
                value: s.to_string(),
            }),
        }
    }
}

/// Severity of the impact on a dependent file.
///
/// Ordered from least to most severe so `Ord` comparisons read naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpactLevel {
    /// Four or more hops away.
    Low,
    /// Three hops away.
    Medium,
    /// Two hops away.
    High,
    /// Imports the target directly.
    Critical,
}

impl ImpactLevel {
    /// Classify a traversal distance.
    ///
    /// Distance 0 is the target itself and never appears in results; it is
    /// treated like a direct import.
    #[must_use]
    pub fn from_distance(distance: u32) -> Self {
        match distance {
            0 | 1 => Self::Critical,
            2 => Self::High,
            3 => Self::Medium,
            _ => Self::Low,
        }
    }

    /// Display color for this level.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Critical => "#dc2626",
            Self::High => "#ea580c",
            Self::Medium => "#ca8a04",
            Self::Low => "#2563eb",
        }
    }

    /// Upper-case wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file affected by the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactedFile {
    /// Node id of the affected file.
    pub node_id: String,
    /// Path of the affected file.
    pub path: String,
    /// Severity, derived from `distance`.
    pub impact_level: ImpactLevel,
    /// Hops from the changed file, in discovery order.
    pub distance: u32,
    /// Human-readable explanation.
    pub reason: String,
    /// Display color for `impact_level`.
    pub color: String,
}

/// Bookkeeping about how an analysis was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// When the analysis was computed.
    pub timestamp: DateTime<Utc>,
    /// Effective traversal depth after clamping.
    pub depth: u32,
    /// Wall-clock time spent computing the analysis.
    pub analysis_time_ms: u64,
    /// Whether a traversal guard stopped the walk early.
    #[serde(default)]
    pub truncated: bool,
    /// Nodes discovered by the traversal, including the target.
    #[serde(default)]
    pub nodes_visited: usize,
    /// Whether the risk score is the file-count fallback.
    #[serde(default)]
    pub risk_fallback: bool,
    /// Whether the recommendations are the generic fallback.
    #[serde(default)]
    pub recommendations_fallback: bool,
}

/// Result of an impact analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    /// The changed file.
    pub target: String,
    /// The kind of change analyzed.
    pub change_type: ChangeType,
    /// Affected files, most severe and nearest first.
    pub impacted_files: Vec<ImpactedFile>,
    /// Normalized risk in `[0, 10]`, one decimal.
    pub risk_score: f64,
    /// Circular paths found during traversal, each closing on its first node.
    pub circular_dependencies: Vec<Vec<String>>,
    /// Advisory text, never empty.
    pub recommendations: Vec<String>,
    /// How the analysis was produced.
    pub metadata: AnalysisMetadata,
}

impl ImpactAnalysis {
    /// Number of impacted files at the given level.
    #[must_use]
    pub fn count_at(&self, level: ImpactLevel) -> usize {
        self.impacted_files
            .iter()
            .filter(|f| f.impact_level == level)
            .count()
    }
}

/// Input to [`ImpactEngine::analyze_impact`](crate::ImpactEngine::analyze_impact).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Workspace-relative path of the changed file.
    pub target: String,
    /// Raw change type, validated by the engine.
    pub change_type: String,
    /// Requested traversal depth, clamped by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<i64>,
}

impl AnalysisRequest {
    /// Create a request with the default depth.
    #[must_use]
    pub fn new(target: impl Into<String>, change_type: ChangeType) -> Self {
        Self {
            target: target.into(),
            change_type: change_type.as_str().to_string(),
            depth: None,
        }
    }

    /// Set the requested depth.
    #[must_use]
    pub fn with_depth(mut self, depth: i64) -> Self {
        self.depth = Some(depth);
        self
    }
}

//! # Ripple: Dependency Impact Analysis
//!
//! Ripple answers "what breaks if I change this file?". Given a dependency
//! graph and a changed file, it walks the reverse-dependency relation to find
//! every affected file, classifies each by distance, detects import loops,
//! and condenses the result into a 0-10 risk score with recommendations.
//!
//! ## Design Philosophy
//!
//! - **Graph in, analysis out** - Ripple does not parse source code; a scanner
//!   hands it nodes and edges through a [`GraphProvider`]
//! - **Bounded** - traversals stop at depth, node, operation, and time limits
//!   and return partial results rather than failing
//! - **Best effort** - scoring and recommendations degrade to simple fallbacks
//!   instead of failing the analysis
//! - **Embeddable** - library first, CLI second
//!
//! ## Quick Start
//!
//! ```
//! use ripple::{AnalysisRequest, ChangeType, Graph, ImpactEngine, ImpactLevel};
//!
//! let engine = ImpactEngine::default();
//! engine.load_graph(Graph::from_pairs(
//!     &["src/db.ts", "src/auth.ts", "src/main.ts"],
//!     &[("src/auth.ts", "src/db.ts"), ("src/main.ts", "src/auth.ts")],
//! ));
//!
//! let analysis = engine.analyze_impact(&AnalysisRequest::new("src/db.ts", ChangeType::Modify))?;
//!
//! assert_eq!(analysis.impacted_files[0].node_id, "src/auth.ts");
//! assert_eq!(analysis.impacted_files[0].impact_level, ImpactLevel::Critical);
//! assert!(analysis.risk_score > 0.0);
//! # Ok::<(), ripple::Error>(())
//! ```

pub mod cache;
pub mod config;
mod engine;
mod error;
pub mod graph;
pub mod recommendations;
pub mod risk;
pub mod suggest;
pub mod traversal;
mod types;

pub use cache::{CacheStats, ResultCache};
pub use config::{CacheConfig, EngineConfig, TraversalLimits};
pub use engine::{ImpactEngine, normalize_target};
pub use error::{Degraded, Error, Result};
pub use graph::{GraphProvider, GraphSnapshot, GraphStore, JsonFileProvider, StaticProvider};
pub use suggest::{FileNameSuggester, SuggestionProvider};
pub use traversal::{
    CancellationFlag, DepthFirstTraversal, TraversalOutcome, Traverse, TruncationReason,
};
pub use types::{
    AnalysisMetadata, AnalysisRequest, ChangeType, Edge, Graph, GraphMetadata, ImpactAnalysis,
    ImpactLevel, ImpactedFile, Node,
};

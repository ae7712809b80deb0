//! The impact analysis pipeline.
//!
//! ```text
//! request ─► validate ─► graph snapshot ─► cache ─┬─ hit ─► result
//!                                                 └─ miss ─► traverse ─► score ─► recommend ─► cache ─► result
//! ```
//!
//! Only validation, a missing target, and a missing graph fail a request.
//! Guard trips in the traversal produce a partial result flagged
//! `truncated`, and scoring or recommendation problems fall back to simpler
//! answers flagged in the result metadata.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cache::{ResultCache, Sweeper, cache_key};
use crate::config::EngineConfig;
use crate::error::{Error, Result, settle};
use crate::graph::{GraphProvider, GraphSnapshot, GraphStore};
use crate::recommendations::{self, RecommendationContext};
use crate::risk::{self, RiskFactors};
use crate::suggest::{FileNameSuggester, SuggestionProvider};
use crate::traversal::{CancellationFlag, DepthFirstTraversal, Traverse, TruncationReason};
use crate::types::{
    AnalysisMetadata, AnalysisRequest, ChangeType, Graph, ImpactAnalysis, ImpactLevel,
    ImpactedFile,
};

/// Dependency impact analysis engine.
///
/// Owns (or shares) a [`GraphStore`], a [`ResultCache`], and the traversal
/// strategy. Loading a graph while an analysis is running is safe: the
/// analysis keeps the snapshot it started with.
pub struct ImpactEngine {
    config: EngineConfig,
    store: Arc<GraphStore>,
    cache: Option<Arc<ResultCache>>,
    traversal: Arc<dyn Traverse>,
    suggester: Option<Arc<dyn SuggestionProvider>>,
    _sweeper: Option<Sweeper>,
}

impl std::fmt::Debug for ImpactEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImpactEngine")
            .field("config", &self.config)
            .field("graph_loaded", &self.store.is_loaded())
            .field("cache_entries", &self.cache.as_ref().map(|c| c.len()))
            .finish_non_exhaustive()
    }
}

impl Default for ImpactEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ImpactEngine {
    /// Create an engine with an empty graph store.
    ///
    /// Starts the background cache sweeper when the configuration enables it.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let cache = config
            .cache
            .enabled
            .then(|| Arc::new(ResultCache::from_config(&config.cache)));
        let sweeper = cache
            .as_ref()
            .zip(config.cache.sweep_interval())
            .map(|(cache, interval)| cache.spawn_sweeper(interval));

        Self {
            config,
            store: Arc::new(GraphStore::new()),
            cache,
            traversal: Arc::new(DepthFirstTraversal::new(config.traversal)),
            suggester: Some(Arc::new(FileNameSuggester::default())),
            _sweeper: sweeper,
        }
    }

    /// Use a shared graph store instead of a private one.
    #[must_use]
    pub fn with_store(mut self, store: Arc<GraphStore>) -> Self {
        self.store = store;
        self
    }

    /// Replace the traversal strategy.
    #[must_use]
    pub fn with_traversal(mut self, traversal: Arc<dyn Traverse>) -> Self {
        self.traversal = traversal;
        self
    }

    /// Replace (or with `None`, disable) the not-found suggestion provider.
    #[must_use]
    pub fn with_suggestions(mut self, suggester: Option<Arc<dyn SuggestionProvider>>) -> Self {
        self.suggester = suggester;
        self
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The graph store.
    #[must_use]
    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    /// The result cache, if caching is enabled.
    #[must_use]
    pub fn cache(&self) -> Option<&Arc<ResultCache>> {
        self.cache.as_ref()
    }

    // === Graph ===

    /// Replace the current graph and drop every cached result.
    pub fn load_graph(&self, graph: Graph) -> Arc<GraphSnapshot> {
        let snapshot = self.store.load(graph);
        if let Some(cache) = &self.cache {
            cache.clear();
        }
        snapshot
    }

    /// Load the graph produced by `provider`.
    ///
    /// # Errors
    ///
    /// Whatever the provider returns. The current graph is left unchanged.
    pub fn load_from(&self, provider: &dyn GraphProvider) -> Result<Arc<GraphSnapshot>> {
        let graph = provider.provide()?;
        Ok(self.load_graph(graph))
    }

    /// Drop the current graph and every cached result.
    pub fn clear_graph(&self) {
        self.store.clear();
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// A copy of the current graph, if one is loaded.
    #[must_use]
    pub fn current_graph(&self) -> Option<Graph> {
        self.store.current()
    }

    /// Files that directly depend on `node_id`. Empty on a miss.
    #[must_use]
    pub fn dependents_of(&self, node_id: &str) -> Vec<String> {
        self.store.dependents_of(node_id)
    }

    // === Analysis ===

    /// Analyze the impact of changing `request.target`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTarget`] / [`Error::InvalidChangeType`] for a malformed request
    /// - [`Error::GraphUnavailable`] if no graph is loaded
    /// - [`Error::TargetNotFound`] if the target is not a node of the graph
    pub fn analyze_impact(&self, request: &AnalysisRequest) -> Result<ImpactAnalysis> {
        self.analyze_impact_with(request, &CancellationFlag::new())
    }

    /// Like [`analyze_impact`](Self::analyze_impact), observing `cancel`.
    ///
    /// # Errors
    ///
    /// As [`analyze_impact`](Self::analyze_impact), plus [`Error::Cancelled`]
    /// if `cancel` is set before the traversal finishes.
    pub fn analyze_impact_with(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationFlag,
    ) -> Result<ImpactAnalysis> {
        let target = normalize_target(&request.target)?;
        let change_type: ChangeType = request.change_type.parse()?;
        let depth = self.config.effective_depth(request.depth);

        let snapshot = self.store.snapshot().ok_or(Error::GraphUnavailable)?;

        let key = cache_key(&target, change_type, depth, snapshot.version());
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            debug!(file = %target, %change_type, depth, "Serving cached impact analysis");
            return Ok(hit);
        }

        if !snapshot.contains(&target) {
            let suggestions = self
                .suggester
                .as_ref()
                .map(|s| s.suggest(&target, &snapshot))
                .unwrap_or_default();
            return Err(Error::TargetNotFound {
                target,
                suggestions,
            });
        }

        let (analysis, truncation) =
            self.compute(&snapshot, &target, change_type, depth, cancel)?;

        if let Some(cache) = &self.cache {
            // A wall-clock cutoff lands somewhere different on every run.
            if truncation == Some(TruncationReason::TimeBudget) {
                debug!(file = %target, "Not caching time-bounded partial result");
            } else {
                cache.put(&key, &analysis);
            }
        }

        Ok(analysis)
    }

    fn compute(
        &self,
        snapshot: &GraphSnapshot,
        target: &str,
        change_type: ChangeType,
        depth: u32,
        cancel: &CancellationFlag,
    ) -> Result<(ImpactAnalysis, Option<TruncationReason>)> {
        let started = Instant::now();

        let outcome = self.traversal.traverse(snapshot, target, depth, cancel);
        if outcome.truncation == Some(TruncationReason::Cancelled) {
            return Err(Error::Cancelled);
        }

        let mut impacted_files: Vec<ImpactedFile> = outcome
            .discovered
            .iter()
            .filter_map(|id| {
                let distance = outcome.distance(id)?;
                Some(impacted_file(snapshot, target, id, distance))
            })
            .collect();
        sort_by_severity(&mut impacted_files);

        let factors = RiskFactors::from_impacts(&impacted_files, outcome.cycles.len());
        let (risk_score, risk_fallback) = settle(risk::calculate(&factors, change_type));
        if let Some(reason) = &risk_fallback {
            warn!(file = target, %reason, "Risk scoring degraded, using file-count fallback");
        }

        let (recommendations, recs_fallback) =
            settle(recommendations::generate(&RecommendationContext {
                target,
                change_type,
                risk_score,
                impacted_files: &impacted_files,
                cycles: &outcome.cycles,
            }));
        if let Some(reason) = &recs_fallback {
            warn!(file = target, %reason, "Recommendations degraded, using generic advice");
        }

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            file = target,
            %change_type,
            depth,
            impacted = impacted_files.len(),
            cycles = outcome.cycles.len(),
            risk_score,
            truncated = outcome.truncated(),
            elapsed_ms,
            "Impact analysis completed"
        );

        let analysis = ImpactAnalysis {
            target: target.to_string(),
            change_type,
            impacted_files,
            risk_score,
            circular_dependencies: outcome.cycles,
            recommendations,
            metadata: AnalysisMetadata {
                timestamp: Utc::now(),
                depth,
                analysis_time_ms: elapsed_ms,
                truncated: outcome.truncation.is_some(),
                nodes_visited: outcome.discovered.len() + 1,
                risk_fallback: risk_fallback.is_some(),
                recommendations_fallback: recs_fallback.is_some(),
            },
        };
        Ok((analysis, outcome.truncation))
    }
}

/// Normalize a workspace-relative target path.
///
/// Converts backslashes to slashes and strips leading `./` and trailing
/// slashes.
///
/// # Errors
///
/// [`Error::InvalidTarget`] for empty targets or targets containing NUL.
pub fn normalize_target(raw: &str) -> Result<String> {
    if raw.contains('\0') {
        return Err(Error::InvalidTarget("target contains a NUL byte".into()));
    }

    let mut target = raw.trim().replace('\\', "/");
    while let Some(rest) = target.strip_prefix("./") {
        target = rest.to_string();
    }
    while target.len() > 1 && target.ends_with('/') {
        target.pop();
    }

    if target.is_empty() || target == "." {
        return Err(Error::InvalidTarget(format!(
            "target must be a file path, got '{raw}'"
        )));
    }
    Ok(target)
}

fn impacted_file(snapshot: &GraphSnapshot, target: &str, id: &str, distance: u32) -> ImpactedFile {
    let level = ImpactLevel::from_distance(distance);
    let path = snapshot
        .node(id)
        .map_or_else(|| id.to_string(), |n| n.path.clone());
    let reason = if distance <= 1 {
        format!("Directly imports {target}")
    } else {
        format!("Transitively depends on {target} ({distance} hops)")
    };

    ImpactedFile {
        node_id: id.to_string(),
        path,
        impact_level: level,
        distance,
        reason,
        color: level.color().to_string(),
    }
}

/// Most severe first, then nearest, then by id.
fn sort_by_severity(files: &mut [ImpactedFile]) {
    files.sort_by(|a, b| {
        b.impact_level
            .cmp(&a.impact_level)
            .then(a.distance.cmp(&b.distance))
            .then_with(|| a.node_id.cmp(&b.node_id))
    });
}

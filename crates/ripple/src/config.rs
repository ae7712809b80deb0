//! Engine configuration.
//!
//! Every field has a default, so an empty YAML file (or no file at all)
//! yields a working engine:
//!
//! ```yaml
//! default-depth: 3
//! max-depth: 5
//! traversal:
//!   max-nodes: 1000
//!   max-operations: 10000
//!   time-budget-ms: 25000
//!   max-cycles: 50
//!   checkpoint-interval: 100
//! cache:
//!   enabled: true
//!   ttl-secs: 300
//!   capacity: 100
//!   sweep-interval-secs: 60
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Depth used when a request does not specify one.
pub const DEFAULT_DEPTH: u32 = 3;

/// Largest depth a request may ask for; larger values are clamped.
pub const MAX_DEPTH: u32 = 5;

/// Bounds on a single traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TraversalLimits {
    /// Stop discovering once this many nodes are known.
    pub max_nodes: usize,
    /// Upper bound on visit operations, further capped at `max_nodes * 10`.
    pub max_operations: usize,
    /// Wall-clock budget in milliseconds.
    pub time_budget_ms: u64,
    /// Stop recording cycles after this many.
    pub max_cycles: usize,
    /// Check the clock and cancellation flag every this many operations.
    pub checkpoint_interval: usize,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            max_nodes: 1000,
            max_operations: 10_000,
            time_budget_ms: 25_000,
            max_cycles: 50,
            checkpoint_interval: 100,
        }
    }
}

impl TraversalLimits {
    /// Operation cap actually enforced.
    #[must_use]
    pub fn operation_cap(&self) -> usize {
        self.max_operations.min(self.max_nodes.saturating_mul(10))
    }

    /// Wall-clock budget.
    #[must_use]
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }
}

/// Result cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheConfig {
    /// Whether results are cached at all.
    pub enabled: bool,
    /// How long an entry stays fresh, in seconds.
    pub ttl_secs: u64,
    /// Maximum number of entries.
    pub capacity: usize,
    /// Interval of the background sweep, in seconds. Zero disables it.
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300,
            capacity: 100,
            sweep_interval_secs: 60,
        }
    }
}

impl CacheConfig {
    /// Entry time-to-live.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Background sweep interval, `None` when disabled.
    #[must_use]
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Depth used when a request omits it.
    pub default_depth: u32,
    /// Requests asking for more are clamped to this.
    pub max_depth: u32,
    /// Traversal guards.
    pub traversal: TraversalLimits,
    /// Result cache settings.
    pub cache: CacheConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_depth: DEFAULT_DEPTH,
            max_depth: MAX_DEPTH,
            traversal: TraversalLimits::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file cannot be read
    /// - [`Error::Config`] if the YAML is malformed or fails [`validate`](Self::validate)
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the YAML is malformed or fails
    /// [`validate`](Self::validate).
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings describe a usable engine.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] naming the first setting that is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::Config("max-depth must be at least 1".into()));
        }
        if self.default_depth == 0 || self.default_depth > self.max_depth {
            return Err(Error::Config(format!(
                "default-depth must be between 1 and {}, got {}",
                self.max_depth, self.default_depth
            )));
        }
        if self.traversal.max_nodes == 0 {
            return Err(Error::Config("traversal.max-nodes must be at least 1".into()));
        }
        if self.traversal.checkpoint_interval == 0 {
            return Err(Error::Config(
                "traversal.checkpoint-interval must be at least 1".into(),
            ));
        }
        if self.cache.enabled && self.cache.capacity == 0 {
            return Err(Error::Config(
                "cache.capacity must be at least 1 when the cache is enabled".into(),
            ));
        }
        Ok(())
    }

    /// Clamp a requested depth into `[1, max_depth]`, defaulting when absent.
    ///
    /// Total over unvalidated configs: a `max_depth` of zero acts as one and
    /// an out-of-range `default_depth` is clamped like a requested depth.
    #[must_use]
    pub fn effective_depth(&self, requested: Option<i64>) -> u32 {
        let max = self.max_depth.max(1);
        let depth = requested.unwrap_or_else(|| i64::from(self.default_depth));
        let clamped = depth.clamp(1, i64::from(max));
        u32::try_from(clamped).unwrap_or(max)
    }
}

//! Error types for Ripple operations.
//!
//! Errors fall into two groups:
//!
//! - **Caller errors** (analogous to HTTP 4xx): bad target, bad change type,
//!   target missing from the graph, no graph loaded. The request is rejected
//!   before any partial result is produced.
//! - **Infrastructure errors** (analogous to HTTP 5xx): I/O, malformed graph
//!   files, bad configuration, cancelled traversals.
//!
//! Risk scoring and recommendation generation never surface here. They
//! degrade to documented fallbacks, reported through [`Degraded`].

use thiserror::Error;

/// Result type for Ripple operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for Ripple operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The target path is empty or malformed.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// The change type is not one of the supported kinds.
    #[error("invalid change type '{value}'. Valid values: refactor, delete, modify, add-feature")]
    InvalidChangeType {
        /// The value that was provided.
        value: String,
    },

    /// The target is not a node of the current graph.
    #[error("{}", not_found_message(.target, .suggestions))]
    TargetNotFound {
        /// The (normalized) target that was looked up.
        target: String,
        /// Similar node ids, possibly empty.
        suggestions: Vec<String>,
    },

    /// No dependency graph has been loaded.
    #[error("no dependency graph loaded. Run a scan to build one first.")]
    GraphUnavailable,

    /// The traversal observed a cancellation request.
    #[error("impact analysis cancelled")]
    Cancelled,

    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A graph file could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

fn not_found_message(target: &str, suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        format!("target not found in dependency graph: {target}")
    } else {
        format!(
            "target not found in dependency graph: {target}. Did you mean: {}?",
            suggestions.join(", ")
        )
    }
}

impl Error {
    /// Returns `true` if the caller can fix this error by changing the request.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTarget(_)
                | Self::InvalidChangeType { .. }
                | Self::TargetNotFound { .. }
                | Self::GraphUnavailable
        )
    }

    /// Suggestions attached to a not-found error, empty for every other kind.
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::TargetNotFound { suggestions, .. } => suggestions,
            _ => &[],
        }
    }
}

/// A best-effort computation that fell back to a simpler answer.
///
/// Used as the `Err` arm of `Result<T, Degraded<T>>` so that callers can both
/// observe that the fallback was taken and still use its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Degraded<T> {
    /// The fallback value.
    pub value: T,
    /// Why the primary computation was abandoned.
    pub reason: String,
}

impl<T> Degraded<T> {
    /// Create a degraded result.
    #[must_use]
    pub fn new(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            reason: reason.into(),
        }
    }
}

/// Collapse a best-effort result into its value, reporting whether the
/// fallback was used.
pub(crate) fn settle<T>(result: std::result::Result<T, Degraded<T>>) -> (T, Option<String>) {
    match result {
        Ok(value) => (value, None),
        Err(degraded) => (degraded.value, Some(degraded.reason)),
    }
}

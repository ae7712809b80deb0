//! Time-bounded cache of analysis results.
//!
//! Entries expire after a TTL and are purged lazily on read as well as by an
//! optional background sweeper. When the cache is full the entry that was
//! inserted first is evicted; reads do not refresh an entry's position, so
//! this is oldest-insertion eviction rather than LRU.
//!
//! Stored results are owned copies. Readers always receive a clone, so no
//! caller can mutate what another caller will read.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::CacheConfig;
use crate::types::{ChangeType, ImpactAnalysis};

/// Derive the cache key for a request.
///
/// `graph_version` is a coarse proxy for graph identity (the node count), so
/// two different graphs with the same node count share keys.
#[must_use]
pub fn cache_key(target: &str, change_type: ChangeType, depth: u32, graph_version: u64) -> String {
    #[derive(Serialize)]
    struct KeyMaterial<'a> {
        target: &'a str,
        change_type: ChangeType,
        depth: u32,
        graph_version: u64,
    }

    let material = KeyMaterial {
        target,
        change_type,
        depth,
        graph_version,
    };
    // Plain fields always serialize.
    let bytes = serde_json::to_vec(&material).unwrap_or_else(|_| {
        format!("{target}|{change_type}|{depth}|{graph_version}").into_bytes()
    });

    format!("{:x}", Sha256::digest(&bytes))
}

/// A cached result and when it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored analysis.
    pub result: ImpactAnalysis,
    /// When the entry was stored.
    pub inserted_at: Instant,
    /// The key it is stored under.
    pub key: String,
}

/// Counters describing cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads that returned a fresh entry.
    pub hits: u64,
    /// Reads that found nothing, or only a stale entry.
    pub misses: u64,
    /// Entries dropped to make room.
    pub evictions: u64,
    /// Entries dropped because they expired.
    pub expirations: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    /// Keys in insertion order, oldest first.
    order: VecDeque<String>,
    stats: CacheStats,
}

impl Inner {
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(entry)
    }
}

/// Analysis result cache with TTL expiry and oldest-insertion eviction.
#[derive(Debug)]
pub struct ResultCache {
    inner: Mutex<Inner>,
    ttl: Duration,
    capacity: usize,
}

impl ResultCache {
    /// Create a cache holding up to `capacity` entries for `ttl` each.
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Create a cache from configuration.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl(), config.capacity)
    }

    /// Entry time-to-live.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// A fresh copy of the result stored under `key`.
    ///
    /// An expired entry is removed and reported as a miss.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<ImpactAnalysis> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&self, key: &str, now: Instant) -> Option<ImpactAnalysis> {
        let mut inner = self.lock();

        let Some(inserted_at) = inner.entries.get(key).map(|e| e.inserted_at) else {
            inner.stats.misses += 1;
            debug!(key, "Cache miss");
            return None;
        };

        if now.saturating_duration_since(inserted_at) <= self.ttl {
            inner.stats.hits += 1;
            debug!(key, "Cache hit");
            return inner.entries.get(key).map(|e| e.result.clone());
        }

        inner.remove(key);
        inner.stats.misses += 1;
        inner.stats.expirations += 1;
        debug!(key, "Cache entry expired");
        None
    }

    /// Store a copy of `result` under `key`.
    ///
    /// Replacing an existing key counts as a new insertion. If the cache is
    /// full, the oldest inserted entry is evicted first.
    pub fn put(&self, key: &str, result: &ImpactAnalysis) {
        self.put_at(key, result, Instant::now());
    }

    pub(crate) fn put_at(&self, key: &str, result: &ImpactAnalysis, now: Instant) {
        let mut inner = self.lock();

        inner.remove(key);
        while inner.entries.len() >= self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
            inner.stats.evictions += 1;
            debug!(key = %oldest, "Evicted oldest cache entry");
        }

        inner.entries.insert(
            key.to_string(),
            CacheEntry {
                result: result.clone(),
                inserted_at: now,
                key: key.to_string(),
            },
        );
        inner.order.push_back(key.to_string());
    }

    /// Remove every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub(crate) fn purge_expired_at(&self, now: Instant) -> usize {
        let mut inner = self.lock();
        let ttl = self.ttl;

        let before = inner.entries.len();
        inner
            .entries
            .retain(|_, entry| now.saturating_duration_since(entry.inserted_at) <= ttl);
        let removed = before - inner.entries.len();

        if removed > 0 {
            let Inner { entries, order, .. } = &mut *inner;
            order.retain(|k| entries.contains_key(k));
            inner.stats.expirations += removed as u64;
            debug!(removed, remaining = inner.entries.len(), "Purged expired cache entries");
        }
        removed
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    /// Number of stored entries, fresh or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hit, miss, and eviction counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// Start a background thread that purges expired entries every `interval`.
    ///
    /// The thread holds only a weak reference and exits when the cache is
    /// dropped or the returned handle is dropped.
    #[must_use]
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> Sweeper {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let cache: Weak<Self> = Arc::downgrade(self);

        let handle = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let Some(cache) = cache.upgrade() else {
                            break;
                        };
                        cache.purge_expired();
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("Cache sweeper stopped");
        });

        Sweeper {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Entries are immutable snapshots, so a poisoned lock still guards
        // usable data.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a background sweep thread. Dropping it stops the thread.
#[derive(Debug)]
pub struct Sweeper {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Stop the sweeper and wait for its thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnalysisMetadata;
    use chrono::Utc;

    fn analysis(target: &str) -> ImpactAnalysis {
        ImpactAnalysis {
            target: target.to_string(),
            change_type: ChangeType::Modify,
            impacted_files: vec![],
            risk_score: 0.0,
            circular_dependencies: vec![],
            recommendations: vec!["ok".to_string()],
            metadata: AnalysisMetadata {
                timestamp: Utc::now(),
                depth: 3,
                analysis_time_ms: 1,
                truncated: false,
                nodes_visited: 1,
                risk_fallback: false,
                recommendations_fallback: false,
            },
        }
    }

    #[test]
    fn key_is_stable_and_input_sensitive() {
        let a = cache_key("src/a.ts", ChangeType::Modify, 3, 10);
        assert_eq!(a, cache_key("src/a.ts", ChangeType::Modify, 3, 10));
        assert_eq!(a.len(), 64);

        assert_ne!(a, cache_key("src/b.ts", ChangeType::Modify, 3, 10));
        assert_ne!(a, cache_key("src/a.ts", ChangeType::Delete, 3, 10));
        assert_ne!(a, cache_key("src/a.ts", ChangeType::Modify, 4, 10));
        assert_ne!(a, cache_key("src/a.ts", ChangeType::Modify, 3, 11));
    }

    #[test]
    fn put_then_get_returns_copy() {
        let cache = ResultCache::new(Duration::from_secs(60), 10);
        let stored = analysis("a");
        cache.put("k", &stored);

        assert_eq!(cache.get("k"), Some(stored));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn missing_key_is_a_miss() {
        let cache = ResultCache::new(Duration::from_secs(60), 10);
        assert!(cache.get("nope").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn stale_entry_is_purged_on_read() {
        let cache = ResultCache::new(Duration::from_secs(60), 10);
        let t0 = Instant::now();
        cache.put_at("k", &analysis("a"), t0);

        assert!(cache.get_at("k", t0 + Duration::from_secs(30)).is_some());
        assert!(cache.get_at("k", t0 + Duration::from_secs(61)).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn full_cache_evicts_oldest_insertion() {
        let cache = ResultCache::new(Duration::from_secs(60), 2);
        cache.put("first", &analysis("1"));
        cache.put("second", &analysis("2"));

        // Reading does not protect an entry from eviction.
        assert!(cache.get("first").is_some());

        cache.put("third", &analysis("3"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("first").is_none());
        assert!(cache.get("second").is_some());
        assert!(cache.get("third").is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn reinserting_a_key_moves_it_to_newest() {
        let cache = ResultCache::new(Duration::from_secs(60), 2);
        cache.put("a", &analysis("1"));
        cache.put("b", &analysis("2"));
        cache.put("a", &analysis("1b"));
        cache.put("c", &analysis("3"));

        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("a").map(|r| r.target), Some("1b".to_string()));
    }

    #[test]
    fn purge_removes_only_expired() {
        let cache = ResultCache::new(Duration::from_secs(60), 10);
        let t0 = Instant::now();
        cache.put_at("old", &analysis("1"), t0);
        cache.put_at("new", &analysis("2"), t0 + Duration::from_secs(50));

        let removed = cache.purge_expired_at(t0 + Duration::from_secs(70));

        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get_at("new", t0 + Duration::from_secs(70)).is_some());
    }

    #[test]
    fn clear_empties_cache() {
        let cache = ResultCache::new(Duration::from_secs(60), 10);
        cache.put("k", &analysis("a"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn sweeper_purges_in_background() {
        let cache = Arc::new(ResultCache::new(Duration::from_millis(10), 10));
        cache.put("k", &analysis("a"));

        let sweeper = cache.spawn_sweeper(Duration::from_millis(20));
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cache.is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        sweeper.stop();

        assert!(cache.is_empty());
    }

    #[test]
    fn sweeper_exits_when_cache_dropped() {
        let cache = Arc::new(ResultCache::new(Duration::from_secs(60), 10));
        let sweeper = cache.spawn_sweeper(Duration::from_millis(5));
        drop(cache);
        thread::sleep(Duration::from_millis(20));
        // Joining must not hang.
        drop(sweeper);
    }
}

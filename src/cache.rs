//! Analyzer result caching.
//!
//! A small, count-bounded LRU cache keyed by log identity. Analyzing a
//! large trace file is the expensive step of every operation, so callers
//! serving repeated queries keep the finished analyzers here and evict
//! only the least recently used one when the capacity is exceeded.

use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::analyzer::LogAnalyzer;
use crate::config::{CacheConfig, ReconstructionConfig};
use crate::error::Result;

/// Generic count-bounded LRU cache.
#[derive(Debug)]
pub struct LruCache<K, V> {
    /// Entries with their access order (higher = more recent).
    entries: HashMap<K, (u64, V)>,
    /// Global access counter for LRU tracking.
    access_counter: u64,
    /// Maximum number of entries.
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries. A zero
    /// capacity disables caching entirely.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            access_counter: 0,
            capacity,
        }
    }

    /// Look up a value, marking it most recently used on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let entry = self.entries.get_mut(key)?;
        self.access_counter += 1;
        entry.0 = self.access_counter;
        Some(&entry.1)
    }

    /// Insert a value, evicting the least recently used entry when the
    /// capacity would be exceeded.
    pub fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        self.access_counter += 1;
        self.entries.insert(key, (self.access_counter, value));

        if self.entries.len() > self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (order, _))| *order)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                debug!("evicting least recently used cache entry");
                self.entries.remove(&k);
            }
        }
    }

    /// Whether a key is present, without touching its access order.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A pool of fully-analyzed logs keyed by file path.
///
/// Embedding callers that answer repeated queries over the same trace
/// files hold one of these instead of re-analyzing on every request.
#[derive(Debug)]
pub struct AnalyzerPool {
    cache: LruCache<PathBuf, Arc<LogAnalyzer>>,
    settings: ReconstructionConfig,
}

impl AnalyzerPool {
    /// Create a pool sized by `cache.capacity`.
    #[must_use]
    pub fn new(cache: &CacheConfig, settings: ReconstructionConfig) -> Self {
        Self {
            cache: LruCache::new(cache.capacity),
            settings,
        }
    }

    /// Return the analyzer for `path`, loading and analyzing the file
    /// only when it is not already cached.
    pub fn get_or_load(&mut self, path: impl AsRef<Path>) -> Result<Arc<LogAnalyzer>> {
        let path = path.as_ref();
        if let Some(analyzer) = self.cache.get(&path.to_path_buf()) {
            debug!(path = %path.display(), "analyzer cache hit");
            return Ok(Arc::clone(analyzer));
        }
        let analyzer = Arc::new(LogAnalyzer::from_path_with(path, self.settings.clone())?);
        self.cache.put(path.to_path_buf(), Arc::clone(&analyzer));
        Ok(analyzer)
    }

    /// Number of analyzers currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the pool holds no analyzers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Drop every cached analyzer.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

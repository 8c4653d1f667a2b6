//! Rendered-block storage.
//!
//! Maps a block's [`ContentHash`] to the HTML produced for it. Strict LRU:
//! reads and writes both refresh recency, and only capacity pressure evicts.
//! A miss is a "please re-render" signal, never an error.

use lru::LruCache;
use metrics::counter;
use serde::Serialize;
use thiserror::Error;

use super::config::CacheConfig;
use super::keys::ContentHash;

pub(crate) const METRIC_BLOCK_CACHE_HIT: &str = "livepreview_block_cache_hit_total";
pub(crate) const METRIC_BLOCK_CACHE_MISS: &str = "livepreview_block_cache_miss_total";
pub(crate) const METRIC_BLOCK_CACHE_EVICT: &str = "livepreview_block_cache_evict_total";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("block cache capacity must be greater than zero (got {max_size})")]
    InvalidCapacity { max_size: usize },
}

/// Point-in-time cache accounting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`, `0.0` before the first lookup.
    pub hit_rate: f64,
    pub evictions: u64,
}

/// LRU cache of rendered block HTML keyed by content address.
///
/// Owned by exactly one document session. Not thread-safe by contract; the
/// host serialises access.
pub struct BlockCache {
    entries: LruCache<ContentHash, String>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl BlockCache {
    /// Create a cache from configuration. A zero capacity is rejected.
    pub fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        let capacity = config.max_size_non_zero()?;
        Ok(Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
            evictions: 0,
        })
    }

    /// Shorthand for [`BlockCache::new`] with an explicit capacity.
    pub fn with_capacity(max_size: usize) -> Result<Self, CacheError> {
        Self::new(&CacheConfig { max_size })
    }

    /// Look up rendered HTML, refreshing recency on a hit.
    pub fn get(&mut self, key: &ContentHash) -> Option<&str> {
        match self.entries.get(key) {
            Some(html) => {
                self.hits += 1;
                counter!(METRIC_BLOCK_CACHE_HIT).increment(1);
                Some(html.as_str())
            }
            None => {
                self.misses += 1;
                counter!(METRIC_BLOCK_CACHE_MISS).increment(1);
                None
            }
        }
    }

    /// Insert or refresh an entry.
    ///
    /// Re-inserting an existing key replaces its value and makes it most
    /// recent; that is a touch, not an eviction. Inserting a new key into a
    /// full cache evicts exactly one least-recently-used entry, whose key is
    /// returned.
    pub fn put(&mut self, key: ContentHash, html: String) -> Option<ContentHash> {
        if self.entries.contains(&key) {
            self.entries.put(key, html);
            return None;
        }

        let evicted = self
            .entries
            .push(key, html)
            .map(|(evicted_key, _)| evicted_key);
        if evicted.is_some() {
            self.evictions += 1;
            counter!(METRIC_BLOCK_CACHE_EVICT).increment(1);
        }
        evicted
    }

    /// Fetch an entry and refresh its recency without counting a lookup.
    ///
    /// For blocks entering the document that the cache already holds, e.g.
    /// after a pre-render or an undo. Hit/miss accounting keeps describing
    /// diff lookups only.
    pub fn revive(&mut self, key: &ContentHash) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Presence probe that neither refreshes recency nor counts as a lookup.
    pub fn contains(&self, key: &ContentHash) -> bool {
        self.entries.contains(key)
    }

    /// Drop every entry. Hit/miss/eviction counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn get_stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        };

        CacheStats {
            size: self.entries.len(),
            capacity: self.capacity(),
            hits: self.hits,
            misses: self.misses,
            hit_rate,
            evictions: self.evictions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::keys::content_hash;

    fn key(text: &str) -> ContentHash {
        content_hash(text)
    }

    #[test]
    fn zero_capacity_is_a_construction_error() {
        assert!(matches!(
            BlockCache::with_capacity(0),
            Err(CacheError::InvalidCapacity { max_size: 0 })
        ));
    }

    #[test]
    fn lru_eviction_drops_oldest_entry() {
        let mut cache = BlockCache::with_capacity(2).expect("cache");

        assert!(cache.put(key("a"), "<p>a</p>".into()).is_none());
        assert!(cache.put(key("b"), "<p>b</p>".into()).is_none());
        assert_eq!(cache.put(key("c"), "<p>c</p>".into()), Some(key("a")));

        assert!(cache.get(&key("a")).is_none()); // Evicted
        assert_eq!(cache.get(&key("b")), Some("<p>b</p>"));
        assert_eq!(cache.get(&key("c")), Some("<p>c</p>"));
        assert_eq!(cache.get_stats().evictions, 1);
    }

    #[test]
    fn get_refreshes_recency() {
        let mut cache = BlockCache::with_capacity(2).expect("cache");
        cache.put(key("a"), "a".into());
        cache.put(key("b"), "b".into());

        assert!(cache.get(&key("a")).is_some());
        cache.put(key("c"), "c".into());

        assert!(cache.contains(&key("a")));
        assert!(!cache.contains(&key("b")));
    }

    #[test]
    fn reinserting_existing_key_is_a_touch() {
        let mut cache = BlockCache::with_capacity(2).expect("cache");
        cache.put(key("a"), "old".into());
        cache.put(key("b"), "b".into());

        assert!(cache.put(key("a"), "new".into()).is_none());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_stats().evictions, 0);

        cache.put(key("c"), "c".into());
        assert!(!cache.contains(&key("b")));
        assert_eq!(cache.get(&key("a")), Some("new"));
    }

    #[test]
    fn size_never_exceeds_capacity() {
        let mut cache = BlockCache::with_capacity(3).expect("cache");
        for index in 0..50 {
            cache.put(key(&format!("block-{index}")), format!("<p>{index}</p>"));
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.get_stats().evictions, 47);
    }

    #[test]
    fn hits_plus_misses_equals_lookups() {
        let mut cache = BlockCache::with_capacity(4).expect("cache");
        cache.put(key("a"), "a".into());

        let lookups = ["a", "b", "a", "c", "a"];
        for text in lookups {
            let _ = cache.get(&key(text));
        }
        // Presence probes are not lookups.
        assert!(cache.contains(&key("a")));

        let stats = cache.get_stats();
        assert_eq!(stats.hits + stats.misses, lookups.len() as u64);
        assert_eq!(stats.hits, 3);
        assert!((stats.hit_rate - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn revive_refreshes_without_counting() {
        let mut cache = BlockCache::with_capacity(2).expect("cache");
        cache.put(key("a"), "a".into());
        cache.put(key("b"), "b".into());

        assert_eq!(cache.revive(&key("a")), Some("a"));
        assert!(cache.revive(&key("z")).is_none());
        cache.put(key("c"), "c".into());

        assert!(cache.contains(&key("a")));
        assert!(!cache.contains(&key("b")));
        let stats = cache.get_stats();
        assert_eq!((stats.hits, stats.misses), (0, 0));
    }

    #[test]
    fn clear_keeps_counters() {
        let mut cache = BlockCache::with_capacity(2).expect("cache");
        cache.put(key("a"), "a".into());
        let _ = cache.get(&key("a"));
        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.get(&key("a")).is_none());
        let stats = cache.get_stats();
        assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 0));
    }

    #[test]
    fn empty_cache_reports_zero_hit_rate() {
        let cache = BlockCache::with_capacity(1).expect("cache");
        assert_eq!(cache.get_stats().hit_rate, 0.0);
    }
}

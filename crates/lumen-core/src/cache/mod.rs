//! In-memory result cache.
//!
//! Bounded LRU keyed by [`CacheKey`], with a time-to-live measured from
//! insertion. Lookups never extend an entry's lifetime. The cache is shared
//! across concurrent analyses behind a single mutex; the critical sections are
//! a map lookup or insert and never run analysis work.

mod stats;

pub use stats::CacheStats;

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

use crate::config::CacheConfig;
use crate::pipeline::CacheKey;
use crate::types::AnalysisResult;
use stats::StatsTracker;

struct CachedEntry {
    result: AnalysisResult,
    inserted_at: Instant,
}

impl CachedEntry {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= ttl
    }
}

/// Thread-safe LRU + TTL cache of analysis results.
pub struct ResultCache {
    entries: Mutex<LruCache<CacheKey, CachedEntry>>,
    capacity: NonZeroUsize,
    ttl: Duration,
    stats: StatsTracker,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` entries for `ttl` each.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
            ttl,
            stats: StatsTracker::default(),
        }
    }

    /// Build a shared cache from configuration, or `None` when disabled.
    pub fn from_config(config: &CacheConfig) -> Option<Arc<Self>> {
        if !config.enabled {
            tracing::debug!("Result cache disabled");
            return None;
        }
        tracing::debug!(
            "Result cache: {} entries, ttl {}s",
            config.max_entries,
            config.ttl_seconds
        );
        Some(Arc::new(Self::new(
            config.max_entries,
            Duration::from_secs(config.ttl_seconds),
        )))
    }

    /// Look up a live entry, promoting it to most recently used.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<AnalysisResult> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let expired = entries.peek(key).map(|entry| entry.is_expired(self.ttl, now));
        let result = match expired {
            Some(false) => entries.get(key).map(|entry| entry.result.clone()),
            Some(true) => {
                entries.pop(key);
                self.stats.record_expirations(1);
                None
            }
            None => None,
        };
        drop(entries);

        if result.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        result
    }

    /// Store a result, evicting the least recently used entry when full.
    pub fn put(&self, key: CacheKey, result: AnalysisResult) {
        let entry = CachedEntry {
            result,
            inserted_at: Instant::now(),
        };
        let displaced = self.entries.lock().push(key, entry);
        if let Some((old_key, _)) = displaced {
            if old_key != key {
                self.stats.record_eviction();
            }
        }
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let expired: Vec<CacheKey> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.ttl, now))
            .map(|(key, _)| *key)
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        drop(entries);

        self.stats.record_expirations(expired.len() as u64);
        expired.len()
    }

    /// Remove all entries. Counters are kept.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
            .snapshot(self.len() as u64, self.capacity.get() as u64)
    }
}

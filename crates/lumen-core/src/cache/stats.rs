//! Cache statistics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a live entry
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// Entries displaced by capacity pressure
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Entries currently stored
    pub entries: u64,
    /// Maximum number of entries
    pub capacity: u64,
}

impl CacheStats {
    /// Hits over total lookups; 0.0 when nothing has been looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Lock-free counters updated on the lookup path.
#[derive(Debug, Default)]
pub(crate) struct StatsTracker {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl StatsTracker {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expirations(&self, count: u64) {
        self.expirations.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self, entries: u64, capacity: u64) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            entries,
            capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 0.75);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_tracker_snapshot() {
        let tracker = StatsTracker::default();
        tracker.record_hit();
        tracker.record_hit();
        tracker.record_miss();
        tracker.record_eviction();
        tracker.record_expirations(2);

        let stats = tracker.snapshot(5, 10);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expirations, 2);
        assert_eq!(stats.entries, 5);
        assert_eq!(stats.capacity, 10);
    }

    #[test]
    fn test_stats_serialize() {
        let json = serde_json::to_value(CacheStats::default()).unwrap();
        assert_eq!(json["hits"], 0);
        assert_eq!(json["expirations"], 0);
    }
}

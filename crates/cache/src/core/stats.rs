//! Hit/miss accounting

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Monotonic hit and miss counters owned by one cache instance
#[derive(Debug)]
pub struct StatsCounter {
    hits: AtomicU64,
    misses: AtomicU64,
    since: SystemTime,
}

impl Default for StatsCounter {
    fn default() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            since: SystemTime::now(),
        }
    }
}

impl StatsCounter {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CacheStatistics {
        CacheStatistics {
            hits: self.hits(),
            misses: self.misses(),
            stats_since: self.since,
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    pub stats_since: SystemTime,
}

impl CacheStatistics {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_hit_rate() {
        let stats = StatsCounter::default();
        assert_eq!(stats.snapshot().hit_rate(), 0.0);

        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.hits, 3);
        assert_eq!(snapshot.misses, 1);
        assert!((snapshot.hit_rate() - 0.75).abs() < f64::EPSILON);
    }
}

use serde::{Deserialize, Serialize};

/// Point-in-time view of cache metrics.
///
/// Counters are monotonic; `hit_rate` is derived as hits/(hits+misses)
/// and is 0 when no gets have happened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    /// Capacity-triggered LRU removals.
    pub evictions: u64,
    /// TTL / max-age / rule removals (lazy and swept).
    pub expirations: u64,
    /// Sum of entry sizes, maintained incrementally.
    pub total_size_bytes: u64,
    /// Derived: hits / (hits + misses), 0 when the denominator is 0.
    pub hit_rate: f64,
    /// Mean over the last 100 access-time samples, in milliseconds.
    pub average_access_time_ms: f64,
    /// Live entry count (includes not-yet-swept expired entries).
    pub entry_count: usize,
}

//! Lock-light metrics accumulation.
//!
//! Counters are atomics; the access-time window is a small mutex-guarded
//! ring of the most recent samples. A snapshot is a consistent-enough
//! point-in-time read, not a transaction.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use prewarm_core::constants::ACCESS_TIME_WINDOW;
use prewarm_core::models::CacheMetricsSnapshot;

#[derive(Default)]
pub(crate) struct MetricsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
    total_size_bytes: AtomicU64,
    access_times_ms: Mutex<VecDeque<f64>>,
}

impl MetricsRecorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an insert, replacing `old_size` bytes when the key existed.
    pub(crate) fn record_set(&self, size: usize, old_size: Option<usize>) {
        self.sets.fetch_add(1, Ordering::Relaxed);
        if let Some(old) = old_size {
            self.sub_size(old);
        }
        self.add_size(size);
    }

    pub(crate) fn record_delete(&self, size: usize) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        self.sub_size(size);
    }

    pub(crate) fn record_eviction(&self, size: usize) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        self.sub_size(size);
    }

    pub(crate) fn record_expiration(&self, size: usize) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
        self.sub_size(size);
    }

    pub(crate) fn add_size(&self, size: usize) {
        self.total_size_bytes.fetch_add(size as u64, Ordering::Relaxed);
    }

    fn sub_size(&self, size: usize) {
        let _ = self
            .total_size_bytes
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_sub(size as u64))
            });
    }

    pub(crate) fn reset_size(&self) {
        self.total_size_bytes.store(0, Ordering::Relaxed);
    }

    /// Push a hit-path latency sample, keeping only the most recent window.
    pub(crate) fn record_access_time(&self, millis: f64) {
        let mut window = match self.access_times_ms.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if window.len() == ACCESS_TIME_WINDOW {
            window.pop_front();
        }
        window.push_back(millis);
    }

    pub(crate) fn snapshot(&self, entry_count: usize) -> CacheMetricsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            hits as f64 / lookups as f64
        };
        let average_access_time_ms = {
            let window = match self.access_times_ms.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if window.is_empty() {
                0.0
            } else {
                window.iter().sum::<f64>() / window.len() as f64
            }
        };
        CacheMetricsSnapshot {
            hits,
            misses,
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            total_size_bytes: self.total_size_bytes.load(Ordering::Relaxed),
            hit_rate,
            average_access_time_ms,
            entry_count,
        }
    }
}

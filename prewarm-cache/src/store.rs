//! The cache store: TTL expiry, LRU batch eviction, rule-based
//! invalidation, and single-flight `get_or_set`.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::Utc;
use dashmap::DashMap;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use prewarm_core::config::CacheConfig;
use prewarm_core::constants::EVICTION_BATCH_FRACTION;
use prewarm_core::errors::PrewarmResult;
use prewarm_core::events::{EngineEvent, EventBus, SubscriberId};
use prewarm_core::models::{CacheEntry, CacheMetricsSnapshot, InvalidationRule};
use prewarm_core::traits::{Compressor, Encryptor, NoopCompressor, NoopEncryptor, SnapshotStore};

use crate::cleanup::{self, CleanupWorker};
use crate::inflight::{InFlightTable, Role};
use crate::metrics::MetricsRecorder;
use crate::persistence::PersistenceAdapter;

/// Shared state behind every handle to one logical cache.
pub(crate) struct Inner<V> {
    pub(crate) config: CacheConfig,
    pub(crate) entries: DashMap<String, CacheEntry<V>>,
    pub(crate) metrics: MetricsRecorder,
    pub(crate) rules: RwLock<Vec<InvalidationRule<V>>>,
    pub(crate) events: Arc<EventBus>,
}

/// TTL/LRU cache over values serializable as JSON.
///
/// Cloning a `CacheStore` yields another handle to the same cache; the
/// entry map, metrics, rules, and background workers are shared. Call
/// [`destroy`](CacheStore::destroy) once to stop the workers and flush.
pub struct CacheStore<V> {
    inner: Arc<Inner<V>>,
    inflight: Arc<InFlightTable<V>>,
    persistence: Option<Arc<PersistenceAdapter<V>>>,
    cleanup: Arc<CleanupWorker>,
}

impl<V> Clone for CacheStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            inflight: Arc::clone(&self.inflight),
            persistence: self.persistence.clone(),
            cleanup: Arc::clone(&self.cleanup),
        }
    }
}

impl<V> CacheStore<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Create a memory-only cache. Fails fast on invalid configuration.
    pub fn new(config: CacheConfig) -> PrewarmResult<Self> {
        Self::build(config, None)
    }

    /// Create a cache backed by a snapshot store with identity transforms.
    /// The snapshot (minus expired entries) is loaded before this returns.
    pub fn with_persistence(
        config: CacheConfig,
        store: Arc<dyn SnapshotStore>,
    ) -> PrewarmResult<Self> {
        Self::with_persistence_and_transforms(
            config,
            store,
            Arc::new(NoopCompressor),
            Arc::new(NoopEncryptor),
        )
    }

    /// Create a persistent cache with explicit transform strategies.
    pub fn with_persistence_and_transforms(
        config: CacheConfig,
        store: Arc<dyn SnapshotStore>,
        compressor: Arc<dyn Compressor>,
        encryptor: Arc<dyn Encryptor>,
    ) -> PrewarmResult<Self> {
        Self::build(config, Some((store, compressor, encryptor)))
    }

    #[allow(clippy::type_complexity)]
    fn build(
        config: CacheConfig,
        backing: Option<(Arc<dyn SnapshotStore>, Arc<dyn Compressor>, Arc<dyn Encryptor>)>,
    ) -> PrewarmResult<Self> {
        config.validate()?;
        let inner = Arc::new(Inner {
            config: config.clone(),
            entries: DashMap::new(),
            metrics: MetricsRecorder::new(),
            rules: RwLock::new(Vec::new()),
            events: Arc::new(EventBus::new()),
        });
        let persistence = match backing {
            Some((store, compressor, encryptor)) if config.enable_persistence => {
                let adapter = Arc::new(PersistenceAdapter::start(
                    store,
                    compressor,
                    encryptor,
                    Arc::clone(&inner),
                ));
                adapter.load_into_cache();
                Some(adapter)
            }
            _ => None,
        };
        let cleanup = Arc::new(CleanupWorker::spawn(
            Arc::clone(&inner),
            persistence.clone(),
            config.cleanup_interval,
        ));
        Ok(Self {
            inner,
            inflight: Arc::new(InFlightTable::new()),
            persistence,
            cleanup,
        })
    }

    /// Look up `key`. A hit bumps access bookkeeping; an entry past its TTL
    /// is removed on the spot and counted as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let start = Instant::now();
        let now = Utc::now();
        let mut expired_size = None;
        if let Some(mut entry) = self.inner.entries.get_mut(key) {
            if entry.is_expired(now) {
                expired_size = Some(entry.size_bytes);
            } else {
                entry.touch(now);
                let value = entry.value.clone();
                drop(entry);
                self.inner.metrics.record_hit();
                self.inner
                    .metrics
                    .record_access_time(start.elapsed().as_secs_f64() * 1000.0);
                self.inner.events.emit(&EngineEvent::Hit {
                    key: key.to_string(),
                });
                return Some(value);
            }
        }
        if let Some(size) = expired_size {
            if self.inner.entries.remove(key).is_some() {
                self.inner.metrics.record_expiration(size);
                self.inner.events.emit(&EngineEvent::Expired {
                    key: key.to_string(),
                });
                self.mark_dirty();
            }
        }
        self.inner.metrics.record_miss();
        self.inner.events.emit(&EngineEvent::Miss {
            key: key.to_string(),
        });
        None
    }

    /// Insert `value` under `key` with `ttl` (or the configured default).
    ///
    /// Returns false, without caching, when the value cannot be serialized;
    /// a bad value must not poison the store. Inserting a new key into a
    /// full cache first evicts a batch of least-recently-used entries.
    pub fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> bool {
        let size = match serde_json::to_vec(&value) {
            Ok(bytes) => bytes.len(),
            Err(e) => {
                warn!(key, error = %e, "unserializable value rejected");
                self.inner.events.emit(&EngineEvent::Diagnostic {
                    component: "cache".to_string(),
                    message: format!("failed to size value for key '{key}': {e}"),
                });
                return false;
            }
        };
        if !self.inner.entries.contains_key(key)
            && self.inner.entries.len() >= self.inner.config.max_entries
        {
            self.evict_batch();
        }
        let ttl = ttl.unwrap_or(self.inner.config.default_ttl);
        let entry = CacheEntry::new(key, value, ttl, size);
        let old_size = self
            .inner
            .entries
            .insert(key.to_string(), entry)
            .map(|old| old.size_bytes);
        self.inner.metrics.record_set(size, old_size);
        self.inner.events.emit(&EngineEvent::Set {
            key: key.to_string(),
            size_bytes: size,
        });
        self.mark_dirty();
        true
    }

    /// Remove `key`. Returns whether an entry was present.
    pub fn delete(&self, key: &str) -> bool {
        match self.inner.entries.remove(key) {
            Some((_, old)) => {
                self.inner.metrics.record_delete(old.size_bytes);
                self.inner.events.emit(&EngineEvent::Delete {
                    key: key.to_string(),
                });
                self.mark_dirty();
                true
            }
            None => false,
        }
    }

    /// Whether a live (non-expired) entry exists. Does not touch metrics
    /// or access bookkeeping.
    pub fn has(&self, key: &str) -> bool {
        let now = Utc::now();
        self.inner
            .entries
            .get(key)
            .map(|entry| !entry.is_expired(now))
            .unwrap_or(false)
    }

    /// Read a live value without metrics or access bookkeeping.
    fn peek(&self, key: &str) -> Option<V> {
        let now = Utc::now();
        self.inner.entries.get(key).and_then(|entry| {
            if entry.is_expired(now) {
                None
            } else {
                Some(entry.value.clone())
            }
        })
    }

    /// Drop every entry. Counters stay monotonic; tracked size resets.
    pub fn clear(&self) {
        self.inner.entries.clear();
        self.inner.metrics.reset_size();
        self.mark_dirty();
    }

    /// Number of physically present entries (expired-but-unswept included).
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Snapshot of the currently present keys.
    pub fn keys(&self) -> Vec<String> {
        self.inner.entries.iter().map(|e| e.key().clone()).collect()
    }

    /// Delete every entry whose key matches `pattern`. An invalid pattern
    /// removes nothing and returns 0.
    pub fn invalidate(&self, pattern: &str) -> usize {
        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(e) => {
                warn!(pattern, error = %e, "invalid invalidation pattern");
                self.inner.events.emit(&EngineEvent::Diagnostic {
                    component: "cache".to_string(),
                    message: format!("invalid invalidation pattern '{pattern}': {e}"),
                });
                return 0;
            }
        };
        let matching: Vec<String> = self
            .inner
            .entries
            .iter()
            .filter(|entry| regex.is_match(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();
        let mut count = 0;
        for key in matching {
            if self.delete(&key) {
                count += 1;
            }
        }
        self.inner.events.emit(&EngineEvent::Invalidated {
            pattern: pattern.to_string(),
            count,
        });
        count
    }

    /// Return the cached value for `key`, or run `supplier` to produce,
    /// cache, and return it.
    ///
    /// Concurrent callers for the same missing key run the supplier exactly
    /// once: one leader computes while the rest block on its outcome. If
    /// the supplier fails, the leader gets the supplier's error, waiters
    /// get `SupplierFailed`, and nothing is cached.
    pub fn get_or_set<F>(&self, key: &str, supplier: F, ttl: Option<Duration>) -> PrewarmResult<V>
    where
        F: FnOnce() -> PrewarmResult<V>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        match self.inflight.begin(key) {
            Role::Waiter(slot) => slot.wait(key),
            Role::Leader(slot) => {
                // A set may have landed between the miss and leadership.
                if let Some(value) = self.peek(key) {
                    slot.complete(Some(value.clone()));
                    self.inflight.finish(key);
                    return Ok(value);
                }
                match supplier() {
                    Ok(value) => {
                        self.set(key, value.clone(), ttl);
                        slot.complete(Some(value.clone()));
                        self.inflight.finish(key);
                        Ok(value)
                    }
                    Err(err) => {
                        slot.complete(None);
                        self.inflight.finish(key);
                        debug!(key, "supplier failed; nothing cached");
                        Err(err)
                    }
                }
            }
        }
    }

    /// Unconditionally recompute `key` via `supplier` and cache the result.
    pub fn refresh<F>(&self, key: &str, supplier: F, ttl: Option<Duration>) -> PrewarmResult<V>
    where
        F: FnOnce() -> PrewarmResult<V>,
    {
        let value = supplier()?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    /// Register a rule evaluated on every cleanup sweep.
    pub fn add_invalidation_rule(&self, rule: InvalidationRule<V>) {
        let mut rules = match self.inner.rules.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rules.push(rule);
    }

    /// Remove every rule registered under `pattern`. Returns whether any
    /// rule was removed.
    pub fn remove_invalidation_rule(&self, pattern: &str) -> bool {
        let mut rules = match self.inner.rules.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = rules.len();
        rules.retain(|rule| rule.pattern() != pattern);
        rules.len() != before
    }

    /// Run one cleanup sweep now, in addition to the background schedule.
    /// Returns the number of entries removed.
    pub fn run_cleanup(&self) -> usize {
        let removed = cleanup::sweep(&self.inner);
        if removed > 0 {
            self.mark_dirty();
        }
        removed
    }

    /// Point-in-time metrics snapshot.
    pub fn metrics(&self) -> CacheMetricsSnapshot {
        self.inner.metrics.snapshot(self.inner.entries.len())
    }

    /// Subscribe to engine events emitted by this cache.
    pub fn subscribe<F>(&self, callback: F) -> SubscriberId
    where
        F: Fn(&EngineEvent) + Send + Sync + 'static,
    {
        self.inner.events.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.inner.events.unsubscribe(id)
    }

    /// Block until any pending snapshot write has been flushed.
    pub fn flush(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.flush_now();
        }
    }

    /// Stop the background workers, flush a final snapshot, and drop all
    /// entries. Safe to call more than once.
    pub fn destroy(&self) {
        self.cleanup.stop();
        if let Some(persistence) = &self.persistence {
            persistence.shutdown();
        }
        self.inner.entries.clear();
        self.inner.metrics.reset_size();
    }

    /// Evict the least-recently-used batch: 10% of capacity, at least one.
    fn evict_batch(&self) {
        let batch = ((self.inner.config.max_entries as f64 * EVICTION_BATCH_FRACTION).ceil()
            as usize)
            .max(1);
        let mut candidates: Vec<(String, chrono::DateTime<Utc>)> = self
            .inner
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().last_accessed))
            .collect();
        candidates.sort_by_key(|(_, last_accessed)| *last_accessed);
        let mut evicted = 0;
        for (key, _) in candidates.into_iter().take(batch) {
            if let Some((_, old)) = self.inner.entries.remove(&key) {
                self.inner.metrics.record_eviction(old.size_bytes);
                evicted += 1;
            }
        }
        if evicted > 0 {
            debug!(evicted, "evicted least-recently-used batch");
            self.inner.events.emit(&EngineEvent::Evicted { count: evicted });
        }
    }

    fn mark_dirty(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.mark_dirty();
        }
    }
}

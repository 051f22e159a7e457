//! Named cache registry.
//!
//! Components share caches by name through an injected registry handle
//! instead of a process-global map. The registry owns the lifecycle:
//! destroying a name stops that cache's workers.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use prewarm_core::config::CacheConfig;
use prewarm_core::errors::PrewarmResult;

use crate::store::CacheStore;

/// The registry stores JSON-valued caches; typed callers own their stores.
pub type ResponseCache = CacheStore<serde_json::Value>;

/// Maps names to shared cache handles.
pub struct CacheRegistry {
    caches: DashMap<String, ResponseCache>,
    default_config: CacheConfig,
}

impl CacheRegistry {
    pub fn new(default_config: CacheConfig) -> Self {
        Self {
            caches: DashMap::new(),
            default_config,
        }
    }

    /// Get the cache registered under `name`, creating it with the
    /// registry's default configuration on first use.
    pub fn obtain(&self, name: &str) -> PrewarmResult<ResponseCache> {
        self.obtain_with(name, self.default_config.clone())
    }

    /// Get or create the cache under `name` with an explicit configuration.
    /// The configuration only applies on creation; an existing cache keeps
    /// the one it was built with.
    pub fn obtain_with(&self, name: &str, config: CacheConfig) -> PrewarmResult<ResponseCache> {
        match self.caches.entry(name.to_string()) {
            Entry::Occupied(occupied) => Ok(occupied.get().clone()),
            Entry::Vacant(vacant) => {
                debug!(name, "creating cache");
                let cache = CacheStore::new(config)?;
                vacant.insert(cache.clone());
                Ok(cache)
            }
        }
    }

    /// The cache under `name`, if one has been created.
    pub fn get(&self, name: &str) -> Option<ResponseCache> {
        self.caches.get(name).map(|cache| cache.clone())
    }

    /// Tear down the cache under `name`. Returns whether it existed.
    pub fn destroy(&self, name: &str) -> bool {
        match self.caches.remove(name) {
            Some((_, cache)) => {
                cache.destroy();
                true
            }
            None => false,
        }
    }

    /// Tear down every registered cache.
    pub fn destroy_all(&self) {
        let names: Vec<String> = self.caches.iter().map(|e| e.key().clone()).collect();
        for name in names {
            self.destroy(&name);
        }
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}

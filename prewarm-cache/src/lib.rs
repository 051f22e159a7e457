//! # prewarm-cache
//!
//! TTL/LRU cache store with rule-based invalidation, metrics, per-key
//! in-flight coordination, and optional debounced snapshot persistence.
//!
//! The store is a single shared instance: handles are cheap clones over the
//! same map. Background work (cleanup sweeps, persistence flushes) runs on
//! dedicated threads that are stopped and joined by [`CacheStore::destroy`].

mod cleanup;
mod inflight;
mod metrics;

pub mod persistence;
pub mod registry;
pub mod store;

pub use persistence::{JsonFileStore, MemorySnapshotStore};
pub use registry::{CacheRegistry, ResponseCache};
pub use store::CacheStore;

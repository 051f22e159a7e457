//! Debounced snapshot persistence.
//!
//! Mutations mark the cache dirty; a background thread coalesces marks
//! within the debounce window and writes one snapshot per burst. Snapshot
//! failures degrade the cache to memory-only instead of failing the
//! operation that triggered the write.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use chrono::Utc;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use prewarm_core::errors::{CacheError, PrewarmResult};
use prewarm_core::events::EngineEvent;
use prewarm_core::models::CacheEntry;
use prewarm_core::traits::{Compressor, Encryptor, SnapshotStore};

use crate::store::Inner;

/// On-disk framing: records which transforms were applied so a snapshot
/// written below the compression threshold still loads correctly.
#[derive(Serialize, Deserialize)]
struct SnapshotEnvelope {
    compressed: bool,
    encrypted: bool,
    payload: Vec<u8>,
}

struct AdapterState<V> {
    store: Arc<dyn SnapshotStore>,
    compressor: Arc<dyn Compressor>,
    encryptor: Arc<dyn Encryptor>,
    cache: Arc<Inner<V>>,
    /// Set after a failed write; further writes are skipped until restart.
    degraded: AtomicBool,
}

impl<V> AdapterState<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    fn flush(&self) {
        if self.degraded.load(Ordering::Relaxed) {
            return;
        }
        let entries: Vec<CacheEntry<V>> = self
            .cache
            .entries
            .iter()
            .map(|item| item.value().clone())
            .collect();
        let count = entries.len();
        let result = self.write_snapshot(&entries);
        match result {
            Ok(()) => {
                self.cache
                    .events
                    .emit(&EngineEvent::Persisted { entries: count });
            }
            Err(e) => {
                warn!(error = %e, "snapshot write failed; continuing memory-only");
                self.degraded.store(true, Ordering::Relaxed);
                self.cache.events.emit(&EngineEvent::Diagnostic {
                    component: "persistence".to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    fn write_snapshot(&self, entries: &[CacheEntry<V>]) -> PrewarmResult<()> {
        let mut payload = serde_json::to_vec(entries)?;
        let config = &self.cache.config;
        let compressed = config.enable_compression
            && payload.len() >= config.compression_threshold_bytes;
        if compressed {
            payload = self.compressor.compress(&payload)?;
        }
        let encrypted = config.enable_encryption;
        if encrypted {
            payload = self.encryptor.encrypt(&payload)?;
        }
        let envelope = SnapshotEnvelope {
            compressed,
            encrypted,
            payload,
        };
        let bytes = serde_json::to_vec(&envelope)?;
        self.store.save(&config.persistence_key, &bytes)
    }

    fn read_snapshot(&self) -> PrewarmResult<Option<Vec<CacheEntry<V>>>> {
        let key = &self.cache.config.persistence_key;
        let Some(bytes) = self.store.load(key)? else {
            return Ok(None);
        };
        let envelope: SnapshotEnvelope = serde_json::from_slice(&bytes)?;
        let mut payload = envelope.payload;
        if envelope.encrypted {
            payload = self.encryptor.decrypt(&payload)?;
        }
        if envelope.compressed {
            payload = self.compressor.decompress(&payload)?;
        }
        Ok(Some(serde_json::from_slice(&payload)?))
    }
}

enum FlushMsg {
    Dirty,
    Shutdown,
}

/// Owns the snapshot store, the transforms, and the debounce thread.
pub(crate) struct PersistenceAdapter<V> {
    state: Arc<AdapterState<V>>,
    tx: mpsc::Sender<FlushMsg>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<V> PersistenceAdapter<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub(crate) fn start(
        store: Arc<dyn SnapshotStore>,
        compressor: Arc<dyn Compressor>,
        encryptor: Arc<dyn Encryptor>,
        cache: Arc<Inner<V>>,
    ) -> Self {
        let debounce = cache.config.persistence_debounce;
        let state = Arc::new(AdapterState {
            store,
            compressor,
            encryptor,
            cache,
            degraded: AtomicBool::new(false),
        });
        let worker_state = Arc::clone(&state);
        let (tx, rx) = mpsc::channel::<FlushMsg>();
        let handle = thread::spawn(move || loop {
            match rx.recv() {
                Ok(FlushMsg::Dirty) => {
                    // Absorb further marks, but flush within one window of
                    // the first mark even under a continuous write stream.
                    let deadline = Instant::now() + debounce;
                    loop {
                        let remaining = deadline.saturating_duration_since(Instant::now());
                        if remaining.is_zero() {
                            break;
                        }
                        match rx.recv_timeout(remaining) {
                            Ok(FlushMsg::Dirty) => continue,
                            Ok(FlushMsg::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                                worker_state.flush();
                                return;
                            }
                            Err(RecvTimeoutError::Timeout) => break,
                        }
                    }
                    worker_state.flush();
                }
                Ok(FlushMsg::Shutdown) | Err(_) => {
                    worker_state.flush();
                    return;
                }
            }
        });
        Self {
            state,
            tx,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Restore the snapshot into the cache, skipping entries that expired
    /// while on disk. A load failure degrades to an empty cache.
    pub(crate) fn load_into_cache(&self) {
        match self.state.read_snapshot() {
            Ok(Some(entries)) => {
                let now = Utc::now();
                let max_age = self.state.cache.config.max_age;
                let mut loaded = 0;
                for entry in entries {
                    if entry.is_expired(now) || entry.exceeds_max_age(now, max_age) {
                        continue;
                    }
                    self.state.cache.metrics.add_size(entry.size_bytes);
                    self.state.cache.entries.insert(entry.key.clone(), entry);
                    loaded += 1;
                }
                info!(entries = loaded, "snapshot restored");
                self.state
                    .cache
                    .events
                    .emit(&EngineEvent::Loaded { entries: loaded });
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "snapshot load failed; starting empty");
                self.state.cache.events.emit(&EngineEvent::Diagnostic {
                    component: "persistence".to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    /// Schedule a debounced snapshot write.
    pub(crate) fn mark_dirty(&self) {
        if self.state.degraded.load(Ordering::Relaxed) {
            return;
        }
        let _ = self.tx.send(FlushMsg::Dirty);
    }

    /// Write a snapshot now, on the calling thread.
    pub(crate) fn flush_now(&self) {
        self.state.flush();
    }

    /// Final flush, then stop and join the debounce thread. Idempotent.
    pub(crate) fn shutdown(&self) {
        let _ = self.tx.send(FlushMsg::Shutdown);
        let handle = {
            let mut guard = match self.handle.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.take()
        };
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

/// Snapshot store writing one JSON file per key under a directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> PrewarmResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self, key: &str) -> PrewarmResult<Option<Vec<u8>>> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, bytes: &[u8]) -> PrewarmResult<()> {
        // Write-then-rename so a crash mid-write never truncates the
        // previous snapshot.
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, self.path(key))?;
        Ok(())
    }

    fn clear(&self, key: &str) -> PrewarmResult<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory snapshot store, with write-failure injection for tests.
#[derive(Default)]
pub struct MemorySnapshotStore {
    data: DashMap<String, Vec<u8>>,
    fail_writes: AtomicBool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `save` calls fail, to exercise degraded mode.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> PrewarmResult<Option<Vec<u8>>> {
        Ok(self.data.get(key).map(|bytes| bytes.clone()))
    }

    fn save(&self, key: &str, bytes: &[u8]) -> PrewarmResult<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(CacheError::PersistenceUnavailable {
                reason: "simulated write failure".to_string(),
            }
            .into());
        }
        self.data.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn clear(&self, key: &str) -> PrewarmResult<()> {
        self.data.remove(key);
        Ok(())
    }
}

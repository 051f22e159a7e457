//! Background cleanup sweeps.
//!
//! A dedicated thread sweeps the entry map every `cleanup_interval`,
//! removing expired and over-age entries and applying invalidation rules.
//! The worker is cancellable: `stop` wakes it immediately and joins.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use prewarm_core::events::EngineEvent;
use prewarm_core::models::InvalidationAction;

use crate::persistence::PersistenceAdapter;
use crate::store::Inner;

/// One sweep over the entry map. Returns the number of entries removed.
///
/// Rules fire in registration order and all matching rules apply:
/// `Delete` and `Expire` remove the entry; `Refresh` leaves it in place
/// and emits `RefreshRequested` once per key per sweep.
pub(crate) fn sweep<V>(inner: &Inner<V>) -> usize {
    let now = Utc::now();
    let mut to_remove: Vec<String> = Vec::new();
    let mut to_refresh: Vec<String> = Vec::new();
    {
        let rules = match inner.rules.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for item in inner.entries.iter() {
            let key = item.key();
            let entry = item.value();
            if entry.is_expired(now) || entry.exceeds_max_age(now, inner.config.max_age) {
                to_remove.push(key.clone());
                continue;
            }
            let mut removed_by_rule = false;
            for rule in rules.iter().filter(|rule| rule.matches(key, entry)) {
                match rule.action() {
                    InvalidationAction::Delete | InvalidationAction::Expire => {
                        removed_by_rule = true;
                    }
                    InvalidationAction::Refresh => {
                        if !to_refresh.iter().any(|k| k == key) {
                            to_refresh.push(key.clone());
                        }
                    }
                }
            }
            if removed_by_rule {
                to_remove.push(key.clone());
            }
        }
    }
    for key in to_refresh {
        inner.events.emit(&EngineEvent::RefreshRequested { key });
    }
    let mut removed = 0;
    for key in to_remove {
        if let Some((_, old)) = inner.entries.remove(&key) {
            inner.metrics.record_expiration(old.size_bytes);
            inner.events.emit(&EngineEvent::Expired { key });
            removed += 1;
        }
    }
    if removed > 0 {
        debug!(removed, "cleanup sweep");
        inner.events.emit(&EngineEvent::Cleanup { expired: removed });
    }
    removed
}

enum WorkerMsg {
    Shutdown,
}

/// Handle to the sweep thread. Stopping is idempotent.
pub(crate) struct CleanupWorker {
    tx: mpsc::Sender<WorkerMsg>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CleanupWorker {
    pub(crate) fn spawn<V>(
        inner: Arc<Inner<V>>,
        persistence: Option<Arc<PersistenceAdapter<V>>>,
        interval: Duration,
    ) -> Self
    where
        V: Clone + serde::Serialize + serde::de::DeserializeOwned + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel::<WorkerMsg>();
        let handle = thread::spawn(move || loop {
            match rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    let removed = sweep(&inner);
                    if removed > 0 {
                        if let Some(persistence) = &persistence {
                            persistence.mark_dirty();
                        }
                    }
                }
                Ok(WorkerMsg::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        Self {
            tx,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Wake the worker and join it.
    pub(crate) fn stop(&self) {
        let _ = self.tx.send(WorkerMsg::Shutdown);
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

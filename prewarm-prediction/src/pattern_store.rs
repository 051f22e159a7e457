//! Pattern store with background re-analysis.
//!
//! Patterns are analyzed on demand before a prediction and re-analyzed
//! for every known user on a fixed interval. A failing history source
//! degrades to an empty pattern; the prediction path never sees the error.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use dashmap::DashMap;
use tracing::{debug, warn};

use prewarm_core::config::PreloaderConfig;
use prewarm_core::events::{EngineEvent, EventBus};
use prewarm_core::models::UserPattern;
use prewarm_core::traits::InteractionSource;

use crate::analyzer;

struct StoreInner {
    source: Arc<dyn InteractionSource>,
    patterns: DashMap<String, UserPattern>,
    config: PreloaderConfig,
    events: Arc<EventBus>,
}

impl StoreInner {
    fn analyze(&self, user_id: &str) -> UserPattern {
        let pattern = if !self.config.enable_pattern_analysis {
            UserPattern::empty(user_id)
        } else {
            match self.source.history(user_id) {
                Ok(interactions) => analyzer::analyze(user_id, &interactions, &self.config),
                Err(e) => {
                    warn!(user_id, error = %e, "history unavailable; using empty pattern");
                    UserPattern::empty(user_id)
                }
            }
        };
        self.patterns.insert(user_id.to_string(), pattern.clone());
        self.events.emit(&EngineEvent::PatternAnalyzed {
            user_id: user_id.to_string(),
        });
        pattern
    }

    fn refresh_all(&self) -> usize {
        match self.source.known_users() {
            Ok(users) => {
                for user_id in &users {
                    self.analyze(user_id);
                }
                debug!(users = users.len(), "re-analyzed known users");
                users.len()
            }
            Err(e) => {
                warn!(error = %e, "known-user listing failed; keeping stale patterns");
                0
            }
        }
    }
}

enum WorkerMsg {
    Shutdown,
}

/// Per-user pattern cache over an [`InteractionSource`].
///
/// Readers always get the most recent completed analysis; a recompute in
/// flight never blocks a prediction.
pub struct PatternStore {
    inner: Arc<StoreInner>,
    tx: mpsc::Sender<WorkerMsg>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PatternStore {
    /// Build the store and start the periodic refresh worker.
    pub fn new(
        source: Arc<dyn InteractionSource>,
        config: PreloaderConfig,
        events: Arc<EventBus>,
    ) -> Self {
        let interval = config.pattern_refresh_interval;
        let refresh_enabled = config.enable_pattern_analysis;
        let inner = Arc::new(StoreInner {
            source,
            patterns: DashMap::new(),
            config,
            events,
        });
        let worker_inner = Arc::clone(&inner);
        let (tx, rx) = mpsc::channel::<WorkerMsg>();
        let handle = thread::spawn(move || loop {
            match rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if refresh_enabled {
                        worker_inner.refresh_all();
                    }
                }
                Ok(WorkerMsg::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        Self {
            inner,
            tx,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Recompute one user's pattern from the source now.
    pub fn analyze_user(&self, user_id: &str) -> UserPattern {
        self.inner.analyze(user_id)
    }

    /// The stored pattern for `user_id`, analyzing on first use.
    pub fn ensure(&self, user_id: &str) -> UserPattern {
        if let Some(pattern) = self.inner.patterns.get(user_id) {
            return pattern.clone();
        }
        self.inner.analyze(user_id)
    }

    /// The stored pattern, if one has been analyzed.
    pub fn get(&self, user_id: &str) -> Option<UserPattern> {
        self.inner.patterns.get(user_id).map(|p| p.clone())
    }

    /// Re-analyze every user the source knows about. Returns the number
    /// of users processed.
    pub fn refresh_all(&self) -> usize {
        self.inner.refresh_all()
    }

    /// Number of stored patterns.
    pub fn len(&self) -> usize {
        self.inner.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.patterns.is_empty()
    }

    /// Stop and join the refresh worker. Idempotent.
    pub fn stop(&self) {
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

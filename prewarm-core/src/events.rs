//! Lifecycle events and explicit observer registration.
//!
//! The engine emits an [`EngineEvent`] after every observable operation.
//! Subscribers register callbacks on an [`EventBus`]; there is no base-class
//! inheritance and no global emitter. Callbacks run on the emitting thread
//! and must not block.

use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

/// Everything observable about the engine, for metrics and test subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    Hit { key: String },
    Miss { key: String },
    Set { key: String, size_bytes: usize },
    Delete { key: String },
    Expired { key: String },
    Evicted { count: usize },
    Cleanup { expired: usize },
    Invalidated { pattern: String, count: usize },
    /// An invalidation rule with the `Refresh` action matched this key.
    /// The entry stays in place; the owner should recompute via `refresh`.
    RefreshRequested { key: String },
    /// Snapshot loaded at startup.
    Loaded { entries: usize },
    /// Snapshot flushed to the durable store.
    Persisted { entries: usize },
    /// An expected failure was absorbed; the component degraded.
    Diagnostic { component: String, message: String },
    PatternAnalyzed { user_id: String },
    PredictionGenerated { user_id: String, confidence: f64 },
    PreloadCompleted { executed: usize },
    PreloadError { target: String, message: String },
}

/// Opaque handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

type Callback = Box<dyn Fn(&EngineEvent) + Send + Sync>;

/// Fan-out bus with explicit subscribe/unsubscribe lifecycle.
#[derive(Default)]
pub struct EventBus {
    subscribers: DashMap<SubscriberId, Callback>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Returns a handle for later removal.
    pub fn subscribe<F>(&self, callback: F) -> SubscriberId
    where
        F: Fn(&EngineEvent) + Send + Sync + 'static,
    {
        let id = SubscriberId(Uuid::new_v4());
        self.subscribers.insert(id, Box::new(callback));
        id
    }

    /// Remove a subscriber. Returns false if the id was unknown.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Deliver an event to every subscriber.
    pub fn emit(&self, event: &EngineEvent) {
        for entry in self.subscribers.iter() {
            (entry.value())(event);
        }
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

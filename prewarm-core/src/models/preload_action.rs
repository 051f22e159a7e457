use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The kind of work a preload action performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreloadActionKind {
    /// Pre-populate a cached response for an anticipated question.
    CacheResponse,
    /// Warm a module's working set.
    PreloadModule,
    /// Warm an upstream connection. Currently a counted no-op.
    WarmConnection,
    /// Fetch auxiliary data. Currently a counted no-op.
    FetchData,
}

/// A prioritized unit of cache-warming work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreloadAction {
    pub kind: PreloadActionKind,
    pub target: String,
    /// Higher runs sooner.
    pub priority: i32,
    /// Expected usefulness in [0, 1].
    pub estimated_value: f64,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl PreloadAction {
    pub fn new(
        kind: PreloadActionKind,
        target: impl Into<String>,
        priority: i32,
        estimated_value: f64,
    ) -> Self {
        Self {
            kind,
            target: target.into(),
            priority,
            estimated_value: estimated_value.clamp(0.0, 1.0),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata field, builder-style.
    pub fn with_meta(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

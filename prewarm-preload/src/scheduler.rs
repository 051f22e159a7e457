//! The preload scheduler: turns patterns and plans into cache entries.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Timelike, Utc};
use serde_json::{json, Value};
use tracing::{debug, warn};

use prewarm_cache::CacheStore;
use prewarm_core::config::PreloaderConfig;
use prewarm_core::events::{EngineEvent, EventBus};
use prewarm_core::models::{PreloadAction, PreloadActionKind, UserPattern};
use prewarm_core::traits::ModuleCatalog;
use prewarm_prediction::questions;
use prewarm_prediction::PatternStore;

/// Executes prioritized cache-warming work against the response cache.
///
/// Every batch is fire-and-forget: one action's failure is reported via
/// `PreloadError` and skipped, and the batch total reflects only actions
/// that executed.
pub struct PreloadScheduler {
    cache: CacheStore<Value>,
    catalog: Arc<dyn ModuleCatalog>,
    patterns: Arc<PatternStore>,
    config: PreloaderConfig,
    events: Arc<EventBus>,
}

impl PreloadScheduler {
    pub fn new(
        cache: CacheStore<Value>,
        catalog: Arc<dyn ModuleCatalog>,
        patterns: Arc<PatternStore>,
        config: PreloaderConfig,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            cache,
            catalog,
            patterns,
            config,
            events,
        }
    }

    /// Pre-populate responses for the questions these users are likely to
    /// ask. Actions from all patterns are pooled, sorted by priority, and
    /// only the top `max_predictions` execute. Returns the executed count.
    pub fn preload_likely_questions(&self, patterns: &[UserPattern]) -> usize {
        let mut actions = Vec::new();
        for pattern in patterns {
            for question in questions::likely_questions(pattern) {
                let priority = questions::question_priority(pattern, &question);
                let value = questions::question_value(pattern, &question);
                actions.push(
                    PreloadAction::new(PreloadActionKind::CacheResponse, question, priority, value)
                        .with_meta("user_id", json!(pattern.user_id))
                        .with_meta("topics", json!(pattern.preferred_topics)),
                );
            }
        }
        actions.sort_by(|a, b| b.priority.cmp(&a.priority));
        actions.truncate(self.config.max_predictions);
        self.execute_batch(&actions)
    }

    /// Seed the cache with a module's common-question bundle. Questions
    /// already cached are skipped, so repeated calls are idempotent.
    /// Returns the number of newly cached responses.
    pub fn cache_common_responses(&self, module_id: &str) -> usize {
        let mut cached = 0;
        for question in self.catalog.common_questions(module_id) {
            let key = common_response_key(module_id, &question);
            if self.cache.has(&key) {
                continue;
            }
            let payload = json!({
                "question": question,
                "module": module_id,
                "cached": true,
                "timestamp": Utc::now().timestamp_millis(),
            });
            if self.cache.set(&key, payload, None) {
                cached += 1;
            }
        }
        debug!(module_id, cached, "seeded common responses");
        cached
    }

    /// The warmup plan for one analyzed user at a given hour: their top
    /// preferred module (priority 8) plus the hour-appropriate module
    /// (priority 6) when time-based prediction is enabled. A user with no
    /// stored pattern gets an empty plan.
    pub fn plan_warmup(&self, user_id: &str, hour: u32) -> Vec<PreloadAction> {
        let Some(pattern) = self.patterns.get(user_id) else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        if let Some(top_topic) = pattern.preferred_topics.first() {
            actions.push(
                PreloadAction::new(PreloadActionKind::PreloadModule, top_topic.clone(), 8, 0.8)
                    .with_meta("user_id", json!(user_id))
                    .with_meta("reason", json!("preferred_topic")),
            );
        }
        if self.config.enable_time_based_prediction {
            if let Some(module) = time_based_module(hour) {
                actions.push(
                    PreloadAction::new(PreloadActionKind::PreloadModule, module, 6, 0.6)
                        .with_meta("user_id", json!(user_id))
                        .with_meta("reason", json!("time_based"))
                        .with_meta("hour", json!(hour)),
                );
            }
        }
        actions
    }

    /// Build and immediately execute the warmup plan for the current hour.
    pub fn warmup_cache(&self, user_id: &str) -> usize {
        let actions = self.plan_warmup(user_id, Utc::now().hour());
        self.execute_batch(&actions)
    }

    /// Execute a prepared plan (e.g. from a prediction result).
    pub fn execute_plan(&self, actions: &[PreloadAction]) -> usize {
        self.execute_batch(actions)
    }

    fn execute_batch(&self, actions: &[PreloadAction]) -> usize {
        let mut executed = 0;
        for action in actions {
            if self.execute(action) {
                executed += 1;
            }
        }
        self.events
            .emit(&EngineEvent::PreloadCompleted { executed });
        executed
    }

    fn execute(&self, action: &PreloadAction) -> bool {
        let ok = match action.kind {
            PreloadActionKind::CacheResponse => self.store_placeholder("response", action),
            PreloadActionKind::PreloadModule => self.store_placeholder("module", action),
            // Counted no-ops until a connection pool / data source exists.
            PreloadActionKind::WarmConnection => {
                debug!(target = %action.target, "warm connection");
                true
            }
            PreloadActionKind::FetchData => {
                debug!(target = %action.target, "fetch data");
                true
            }
        };
        if !ok {
            warn!(target = %action.target, "preload action failed; skipping");
            self.events.emit(&EngineEvent::PreloadError {
                target: action.target.clone(),
                message: "cache rejected preloaded value".to_string(),
            });
        }
        ok
    }

    fn store_placeholder(&self, kind: &str, action: &PreloadAction) -> bool {
        let key = format!("preloaded-{kind}-{}", action.target);
        let payload = json!({
            "target": action.target,
            "metadata": action.metadata,
            "preloaded": true,
            "timestamp": Utc::now().timestamp_millis(),
        });
        self.cache.set(&key, payload, Some(self.preload_ttl()))
    }

    fn preload_ttl(&self) -> Duration {
        // Preloaded entries share the prediction horizon rather than the
        // cache-wide default.
        self.config.prediction_cache_ttl
    }
}

/// Stable cache key for a module's common question.
fn common_response_key(module_id: &str, question: &str) -> String {
    let hash = blake3::hash(question.as_bytes()).to_hex();
    format!("response-{module_id}-{}", &hash.as_str()[..16])
}

/// Which module the hour of day favors: mornings are academic, afternoons
/// technical, evenings general support.
fn time_based_module(hour: u32) -> Option<&'static str> {
    match hour {
        8..=12 => Some("professor"),
        13..=17 => Some("ti"),
        18..=22 => Some("atendimento"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_ranges_map_to_modules() {
        assert_eq!(time_based_module(8), Some("professor"));
        assert_eq!(time_based_module(12), Some("professor"));
        assert_eq!(time_based_module(13), Some("ti"));
        assert_eq!(time_based_module(17), Some("ti"));
        assert_eq!(time_based_module(18), Some("atendimento"));
        assert_eq!(time_based_module(22), Some("atendimento"));
        assert_eq!(time_based_module(23), None);
        assert_eq!(time_based_module(3), None);
    }

    #[test]
    fn common_response_keys_are_stable_and_distinct() {
        let a = common_response_key("ti", "I need technical support");
        let b = common_response_key("ti", "I need technical support");
        let c = common_response_key("ti", "Connectivity problems");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("response-ti-"));
    }
}

//! The prediction engine: pattern → ranked suggestions → preload plan.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use moka::sync::Cache;
use serde::Serialize;
use tracing::debug;

use prewarm_core::config::PreloaderConfig;
use prewarm_core::events::{EngineEvent, EventBus};
use prewarm_core::models::{
    Confidence, PredictionRequest, PredictionResult, PreloadAction, PreloadActionKind,
    UserPattern,
};

use crate::pattern_store::PatternStore;
use crate::questions;

/// Point-in-time engine counters.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionMetrics {
    pub total_predictions: u64,
    /// Served from the prediction cache.
    pub cache_hits: u64,
    /// Running mean confidence over generated (non-default) predictions.
    pub average_confidence: f64,
    pub pattern_count: usize,
}

/// Derives predictions from stored patterns, caching results briefly so
/// identical requests within the TTL don't recompute the plan.
pub struct PredictionEngine {
    patterns: Arc<PatternStore>,
    config: PreloaderConfig,
    cache: Cache<String, PredictionResult>,
    events: Arc<EventBus>,
    total_predictions: AtomicU64,
    cache_hits: AtomicU64,
    generated: AtomicU64,
    average_confidence: Mutex<f64>,
}

impl PredictionEngine {
    pub fn new(
        patterns: Arc<PatternStore>,
        config: PreloaderConfig,
        events: Arc<EventBus>,
    ) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(config.prediction_cache_ttl)
            .build();
        Self {
            patterns,
            config,
            cache,
            events,
            total_predictions: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            generated: AtomicU64::new(0),
            average_confidence: Mutex::new(0.0),
        }
    }

    /// Predict what the user will need next. Synchronous and non-throwing:
    /// a user with no usable history gets the default prediction.
    pub fn predict_user_needs(&self, request: &PredictionRequest) -> PredictionResult {
        self.total_predictions.fetch_add(1, Ordering::Relaxed);

        let key = Self::cache_key(request);
        if let Some(cached) = self.cache.get(&key) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return cached;
        }

        let pattern = self.patterns.ensure(&request.user_id);
        if pattern.is_empty() {
            debug!(user_id = %request.user_id, "no usable history; default prediction");
            return Self::default_prediction();
        }

        let result = self.generate(request, &pattern);
        self.record_generated(result.confidence.value());
        self.cache.insert(key, result.clone());
        self.events.emit(&EngineEvent::PredictionGenerated {
            user_id: request.user_id.clone(),
            confidence: result.confidence.value(),
        });
        result
    }

    pub fn metrics(&self) -> PredictionMetrics {
        let average_confidence = match self.average_confidence.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        };
        PredictionMetrics {
            total_predictions: self.total_predictions.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            average_confidence,
            pattern_count: self.patterns.len(),
        }
    }

    fn generate(&self, request: &PredictionRequest, pattern: &UserPattern) -> PredictionResult {
        let likely_questions = questions::likely_questions(pattern);
        let suggested_modules: Vec<String> =
            pattern.preferred_topics.iter().take(3).cloned().collect();
        let (confidence, reasoning) = self.score(request, pattern);
        let preload_actions = self.plan_actions(request, pattern);
        PredictionResult {
            likely_questions,
            suggested_modules,
            confidence,
            reasoning,
            preload_actions,
        }
    }

    /// Base 0.5, plus 0.2/0.1/0.1/0.1 for each signal that fires; the
    /// reasoning lists exactly the fired signals.
    fn score(&self, request: &PredictionRequest, pattern: &UserPattern) -> (Confidence, Vec<String>) {
        let mut confidence = 0.5;
        let mut reasoning = Vec::new();

        if !pattern.preferred_topics.is_empty() {
            confidence += 0.2;
            reasoning.push(format!(
                "preferred topics: {}",
                pattern.preferred_topics.join(", ")
            ));
        }
        if pattern.interaction_frequency > 1.0 {
            confidence += 0.1;
            reasoning.push(format!(
                "high interaction frequency ({:.1}/hour)",
                pattern.interaction_frequency
            ));
        }
        if pattern.message_patterns.len() > 5 {
            confidence += 0.1;
            reasoning.push(format!(
                "established message history ({} messages)",
                pattern.message_patterns.len()
            ));
        }
        if self.config.enable_time_based_prediction
            && pattern.is_active_hour(request.context.hour_of_day)
        {
            confidence += 0.1;
            reasoning.push(format!(
                "user is typically active at hour {}",
                request.context.hour_of_day
            ));
        }
        (Confidence::new(confidence), reasoning)
    }

    /// One PreloadModule per preferred topic, decaying by rank, plus one
    /// CacheResponse per topic's common bundle.
    fn plan_actions(&self, request: &PredictionRequest, pattern: &UserPattern) -> Vec<PreloadAction> {
        let mut actions = Vec::new();
        for (rank, topic) in pattern.preferred_topics.iter().enumerate() {
            actions.push(
                PreloadAction::new(
                    PreloadActionKind::PreloadModule,
                    topic.clone(),
                    8 - rank as i32,
                    0.8 - 0.1 * rank as f64,
                )
                .with_meta("user_id", serde_json::json!(request.user_id))
                .with_meta("reason", serde_json::json!("preferred_module")),
            );
        }
        for topic in &pattern.preferred_topics {
            actions.push(
                PreloadAction::new(
                    PreloadActionKind::CacheResponse,
                    format!("common-{topic}"),
                    5,
                    0.6,
                )
                .with_meta("user_id", serde_json::json!(request.user_id))
                .with_meta("module", serde_json::json!(topic)),
            );
        }
        actions
    }

    fn cache_key(request: &PredictionRequest) -> String {
        let context = serde_json::to_string(&request.context).unwrap_or_default();
        let hash = blake3::hash(format!("{}{}", request.user_id, context).as_bytes());
        format!("prediction-{}-{}", request.user_id, hash.to_hex())
    }

    /// Safe fallback for users without usable history: generic, non-empty,
    /// low confidence. Never cached.
    fn default_prediction() -> PredictionResult {
        PredictionResult {
            likely_questions: vec![
                "How can I help you?".to_string(),
                "I need more information".to_string(),
            ],
            suggested_modules: vec!["atendimento".to_string()],
            confidence: Confidence::new(Confidence::DEFAULT_PREDICTION),
            reasoning: vec!["insufficient user history".to_string()],
            preload_actions: Vec::new(),
        }
    }

    fn record_generated(&self, confidence: f64) {
        let n = self.generated.fetch_add(1, Ordering::Relaxed) + 1;
        let mut average = match self.average_confidence.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *average = (*average * (n - 1) as f64 + confidence) / n as f64;
    }
}

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Pattern analysis and predictive preload configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloaderConfig {
    /// Whether interaction history is analyzed into user patterns.
    pub enable_pattern_analysis: bool,
    /// Whether the hour-of-day signal contributes to predictions and warmup.
    pub enable_time_based_prediction: bool,
    /// Maximum preload actions executed per batch.
    pub max_predictions: usize,
    /// How long a prediction result stays cached for identical requests.
    pub prediction_cache_ttl: Duration,
    /// Interval between background re-analysis of all known users.
    pub pattern_refresh_interval: Duration,
    /// Number of recent messages retained in a user pattern.
    pub message_window: usize,
    /// Number of preferred topics derived from module usage.
    pub top_topics: usize,
}

impl Default for PreloaderConfig {
    fn default() -> Self {
        Self {
            enable_pattern_analysis: true,
            enable_time_based_prediction: true,
            max_predictions: defaults::DEFAULT_MAX_PREDICTIONS,
            prediction_cache_ttl: Duration::from_secs(
                defaults::DEFAULT_PREDICTION_CACHE_TTL_SECS,
            ),
            pattern_refresh_interval: Duration::from_secs(defaults::DEFAULT_PATTERN_REFRESH_SECS),
            message_window: defaults::DEFAULT_MESSAGE_WINDOW,
            top_topics: defaults::DEFAULT_TOP_TOPICS,
        }
    }
}

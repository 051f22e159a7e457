/// Prewarm system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Rolling window size for access-time samples.
pub const ACCESS_TIME_WINDOW: usize = 100;

/// Fraction of `max_entries` evicted per capacity-triggered batch.
pub const EVICTION_BATCH_FRACTION: f64 = 0.1;

/// Maximum number of likely questions per prediction.
pub const MAX_LIKELY_QUESTIONS: usize = 5;

/// Feature flags.
pub const FEATURE_PREDICTION: bool = true;
pub const FEATURE_PERSISTENCE: bool = true;

//! Default values for configuration structs.

/// Maximum number of cache entries.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Default TTL for entries without an explicit one (seconds).
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Interval between cleanup sweeps (seconds).
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60;

/// Hard age cap regardless of per-entry TTL (seconds).
pub const DEFAULT_MAX_AGE_SECS: u64 = 3600;

/// Debounce window for batched persistence writes (milliseconds).
pub const DEFAULT_PERSISTENCE_DEBOUNCE_MS: u64 = 500;

/// Snapshot key used when none is configured.
pub const DEFAULT_PERSISTENCE_KEY: &str = "cache-data";

/// Values above this size are candidates for compression (bytes).
pub const DEFAULT_COMPRESSION_THRESHOLD_BYTES: usize = 1024;

/// Maximum preload actions executed per batch.
pub const DEFAULT_MAX_PREDICTIONS: usize = 10;

/// TTL for cached prediction results (seconds).
pub const DEFAULT_PREDICTION_CACHE_TTL_SECS: u64 = 300;

/// Interval between full pattern re-analysis passes (seconds).
pub const DEFAULT_PATTERN_REFRESH_SECS: u64 = 300;

/// Number of recent messages kept per user pattern.
pub const DEFAULT_MESSAGE_WINDOW: usize = 20;

/// Number of preferred topics derived per user pattern.
pub const DEFAULT_TOP_TOPICS: usize = 3;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{CacheError, PrewarmResult};

use super::defaults;

/// Cache store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries. Must be > 0.
    pub max_entries: usize,
    /// TTL applied when `set` is called without an explicit one.
    pub default_ttl: Duration,
    /// Interval between background cleanup sweeps.
    pub cleanup_interval: Duration,
    /// Hard age cap: entries older than this are removed regardless of TTL.
    pub max_age: Duration,
    /// Whether mutations are written through to a snapshot store.
    pub enable_persistence: bool,
    /// Key under which the snapshot is stored.
    pub persistence_key: String,
    /// Debounce window for batched background persistence writes.
    pub persistence_debounce: Duration,
    /// Whether the compression strategy is applied to snapshot bytes.
    pub enable_compression: bool,
    /// Snapshots below this size skip the compression strategy (bytes).
    pub compression_threshold_bytes: usize,
    /// Whether the encryption strategy is applied to snapshot bytes.
    pub enable_encryption: bool,
}

impl CacheConfig {
    /// Validate static configuration. Invalid config fails fast at
    /// construction; everything else degrades at runtime.
    pub fn validate(&self) -> PrewarmResult<()> {
        if self.max_entries == 0 {
            return Err(CacheError::InvalidConfig {
                reason: "max_entries must be > 0".to_string(),
            }
            .into());
        }
        if self.default_ttl.is_zero() {
            return Err(CacheError::InvalidConfig {
                reason: "default_ttl must be nonzero".to_string(),
            }
            .into());
        }
        if self.cleanup_interval.is_zero() {
            return Err(CacheError::InvalidConfig {
                reason: "cleanup_interval must be nonzero".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: defaults::DEFAULT_MAX_ENTRIES,
            default_ttl: Duration::from_secs(defaults::DEFAULT_TTL_SECS),
            cleanup_interval: Duration::from_secs(defaults::DEFAULT_CLEANUP_INTERVAL_SECS),
            max_age: Duration::from_secs(defaults::DEFAULT_MAX_AGE_SECS),
            enable_persistence: true,
            persistence_key: defaults::DEFAULT_PERSISTENCE_KEY.to_string(),
            persistence_debounce: Duration::from_millis(
                defaults::DEFAULT_PERSISTENCE_DEBOUNCE_MS,
            ),
            enable_compression: false,
            compression_threshold_bytes: defaults::DEFAULT_COMPRESSION_THRESHOLD_BYTES,
            enable_encryption: false,
        }
    }
}

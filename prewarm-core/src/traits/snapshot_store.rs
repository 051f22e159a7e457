use crate::errors::PrewarmResult;

/// Durable key-value store for cache snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Load the snapshot bytes stored under `key`, if any.
    fn load(&self, key: &str) -> PrewarmResult<Option<Vec<u8>>>;

    /// Durably write the snapshot bytes under `key`.
    fn save(&self, key: &str, bytes: &[u8]) -> PrewarmResult<()>;

    /// Remove any snapshot stored under `key`.
    fn clear(&self, key: &str) -> PrewarmResult<()>;
}

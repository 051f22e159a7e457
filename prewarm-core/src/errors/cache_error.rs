/// Cache-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("invalid cache configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("failed to size value for key '{key}': {reason}")]
    Serialization { key: String, reason: String },

    #[error("supplier failed for key '{key}'")]
    SupplierFailed { key: String },

    #[error("invalid invalidation pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("persistence unavailable: {reason}")]
    PersistenceUnavailable { reason: String },
}

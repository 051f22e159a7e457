//! Error taxonomy.
//!
//! Per-domain error enums aggregated into [`PrewarmError`]. Expected failure
//! modes (persistence outage, history source outage, single-action preload
//! failures) never surface to request-handling paths; the owning component
//! degrades and emits a diagnostic event instead.

pub mod cache_error;
pub mod pattern_error;
pub mod preload_error;

pub use cache_error::CacheError;
pub use pattern_error::PatternError;
pub use preload_error::PreloadError;

/// Result alias used across the workspace.
pub type PrewarmResult<T> = Result<T, PrewarmError>;

/// Top-level error aggregating all subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum PrewarmError {
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),

    #[error("preload error: {0}")]
    Preload(#[from] PreloadError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

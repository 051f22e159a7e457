//! # prewarm-core
//!
//! Foundation crate for the prewarm cache & predictive preload engine.
//! Defines all types, traits, errors, config, events, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::{CacheConfig, PreloaderConfig};
pub use errors::{PrewarmError, PrewarmResult};
pub use events::{EngineEvent, EventBus, SubscriberId};
pub use models::{
    CacheEntry, CacheMetricsSnapshot, Confidence, Interaction, InvalidationAction,
    InvalidationRule, PredictionRequest, PredictionResult, PreloadAction, PreloadActionKind,
    RequestContext, UserPattern,
};

//! Data model for the cache store and the prediction pipeline.

pub mod confidence;
pub mod entry;
pub mod interaction;
pub mod invalidation;
pub mod metrics;
pub mod prediction;
pub mod preload_action;
pub mod user_pattern;

pub use confidence::Confidence;
pub use entry::CacheEntry;
pub use interaction::Interaction;
pub use invalidation::{InvalidationAction, InvalidationRule};
pub use metrics::CacheMetricsSnapshot;
pub use prediction::{PredictionRequest, PredictionResult, RequestContext};
pub use preload_action::{PreloadAction, PreloadActionKind};
pub use user_pattern::UserPattern;

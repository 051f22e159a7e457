//! # prewarm-prediction
//!
//! Turns per-user interaction history into behavioral patterns and ranked
//! predictions of what to warm next. Pattern analysis is a pure recompute
//! over a bounded history window; predictions are cached briefly so
//! identical requests don't re-derive the same plan.

pub mod analyzer;
pub mod engine;
pub mod pattern_store;
pub mod questions;

pub use analyzer::analyze;
pub use engine::{PredictionEngine, PredictionMetrics};
pub use pattern_store::PatternStore;

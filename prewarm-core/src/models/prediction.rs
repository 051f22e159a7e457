use serde::{Deserialize, Serialize};

use super::confidence::Confidence;
use super::preload_action::PreloadAction;

/// Live request context accompanying a prediction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Current message text.
    pub message: String,
    /// Module the user is in.
    pub module: String,
    /// Hour of day (0–23).
    pub hour_of_day: u32,
    /// Day of week (Mon=1 .. Sun=7, ISO).
    pub day_of_week: u32,
}

/// A request to predict what a user will need next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub user_id: String,
    pub context: RequestContext,
}

/// Ranked suggestions plus the preload plan derived from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Ranked questions the user is likely to ask, capped at 5.
    pub likely_questions: Vec<String>,
    /// Top preferred modules.
    pub suggested_modules: Vec<String>,
    pub confidence: Confidence,
    /// Human-readable list of the signals that fired.
    pub reasoning: Vec<String>,
    /// Ordered preload plan for the scheduler.
    pub preload_actions: Vec<PreloadAction>,
}

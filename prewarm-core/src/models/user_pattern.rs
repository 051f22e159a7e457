use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived behavioral summary of one user's interaction history.
///
/// Fully recomputed on each analysis pass — never incrementally patched —
/// so the summary cannot drift from the underlying history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPattern {
    pub user_id: String,
    /// Most recent messages, bounded by the configured window.
    pub message_patterns: Vec<String>,
    /// Interaction count per module over the window.
    pub module_usage: HashMap<String, u64>,
    /// Top modules by usage count, ties broken by most recent use.
    pub preferred_topics: Vec<String>,
    /// Interaction count per hour of day.
    pub hour_histogram: [u64; 24],
    /// Interactions per hour; sub-hour spans clamp the denominator to 1h.
    pub interaction_frequency: f64,
    /// Mean message character length.
    pub average_message_length: f64,
    pub last_updated: DateTime<Utc>,
}

impl UserPattern {
    /// An empty pattern for a user with no usable history.
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            message_patterns: Vec::new(),
            module_usage: HashMap::new(),
            preferred_topics: Vec::new(),
            hour_histogram: [0; 24],
            interaction_frequency: 0.0,
            average_message_length: 0.0,
            last_updated: Utc::now(),
        }
    }

    /// Whether the pattern carries no signals. Downstream prediction falls
    /// back to the default prediction for empty patterns.
    pub fn is_empty(&self) -> bool {
        self.message_patterns.is_empty() && self.module_usage.is_empty()
    }

    /// Whether the user has historically interacted during this hour.
    pub fn is_active_hour(&self, hour: u32) -> bool {
        self.hour_histogram
            .get(hour as usize)
            .map(|&count| count > 0)
            .unwrap_or(false)
    }
}

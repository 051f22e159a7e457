use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user interaction from the history source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Message text the user sent.
    pub message: String,
    /// Module the interaction happened in.
    pub module_id: String,
    /// When the interaction happened.
    pub timestamp: DateTime<Utc>,
}

impl Interaction {
    pub fn new(
        message: impl Into<String>,
        module_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            message: message.into(),
            module_id: module_id.into(),
            timestamp,
        }
    }
}

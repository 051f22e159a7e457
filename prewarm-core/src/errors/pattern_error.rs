/// Pattern-analysis errors.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("interaction history unavailable for user '{user_id}': {reason}")]
    HistoryUnavailable { user_id: String, reason: String },
}

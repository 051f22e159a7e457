use crate::errors::PrewarmResult;
use crate::models::Interaction;

/// Source of per-user interaction history, time-ordered oldest first.
pub trait InteractionSource: Send + Sync {
    /// Bounded recent history for one user.
    fn history(&self, user_id: &str) -> PrewarmResult<Vec<Interaction>>;

    /// All users the source knows about, for periodic re-analysis.
    fn known_users(&self) -> PrewarmResult<Vec<String>>;
}

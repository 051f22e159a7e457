use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{CacheError, PrewarmResult};

use super::entry::CacheEntry;

/// What happens to an entry matched by an invalidation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationAction {
    /// Remove the entry during the sweep.
    Delete,
    /// Treat the entry as expired and remove it during the sweep.
    Expire,
    /// Leave the entry in place and emit `RefreshRequested` so the owner
    /// can recompute it via `refresh`.
    Refresh,
}

type Predicate<V> = Box<dyn Fn(&str, &CacheEntry<V>) -> bool + Send + Sync>;

/// Key-pattern + predicate + action, evaluated on every cleanup sweep.
/// All matching rules apply to an entry, not just the first.
pub struct InvalidationRule<V> {
    pattern: String,
    regex: Regex,
    predicate: Predicate<V>,
    action: InvalidationAction,
}

impl<V> InvalidationRule<V> {
    /// Compile a rule. Fails on an invalid regex.
    pub fn new<F>(pattern: &str, predicate: F, action: InvalidationAction) -> PrewarmResult<Self>
    where
        F: Fn(&str, &CacheEntry<V>) -> bool + Send + Sync + 'static,
    {
        let regex = Regex::new(pattern).map_err(|e| CacheError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            predicate: Box::new(predicate),
            action,
        })
    }

    /// The source pattern this rule was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn action(&self) -> InvalidationAction {
        self.action
    }

    /// Whether the rule fires for this key/entry pair.
    pub fn matches(&self, key: &str, entry: &CacheEntry<V>) -> bool {
        self.regex.is_match(key) && (self.predicate)(key, entry)
    }
}

impl<V> std::fmt::Debug for InvalidationRule<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidationRule")
            .field("pattern", &self.pattern)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn rule_matches_pattern_and_predicate() {
        let rule: InvalidationRule<u32> = InvalidationRule::new(
            "^session-",
            |_, entry| entry.access_count == 0,
            InvalidationAction::Delete,
        )
        .unwrap();

        let cold = CacheEntry::new("session-1", 1u32, Duration::from_secs(60), 4);
        let mut warm = CacheEntry::new("session-2", 2u32, Duration::from_secs(60), 4);
        warm.touch(chrono::Utc::now());
        let other = CacheEntry::new("user-1", 3u32, Duration::from_secs(60), 4);

        assert!(rule.matches("session-1", &cold));
        assert!(!rule.matches("session-2", &warm));
        assert!(!rule.matches("user-1", &other));
    }

    #[test]
    fn invalid_regex_fails_to_compile() {
        let result: PrewarmResult<InvalidationRule<u32>> =
            InvalidationRule::new("([", |_, _| true, InvalidationAction::Expire);
        assert!(result.is_err());
    }
}

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single cache entry with access bookkeeping.
///
/// Expiry is logical: an entry past its TTL is absent from `get`/`has`
/// even before the cleanup sweep physically removes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: V,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
    pub access_count: u64,
    pub last_accessed: DateTime<Utc>,
    pub size_bytes: usize,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl<V> CacheEntry<V> {
    /// Create a fresh entry timestamped now.
    pub fn new(key: impl Into<String>, value: V, ttl: Duration, size_bytes: usize) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            value,
            created_at: now,
            ttl,
            access_count: 0,
            last_accessed: now,
            size_bytes,
            metadata: HashMap::new(),
        }
    }

    /// Whether `now - created_at >= ttl`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.created_at);
        age >= chrono::Duration::zero() && age.num_milliseconds() as u128 >= self.ttl.as_millis()
    }

    /// Whether the entry exceeds the hard age cap, regardless of TTL.
    pub fn exceeds_max_age(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        let age = now.signed_duration_since(self.created_at);
        age >= chrono::Duration::zero() && age.num_milliseconds() as u128 >= max_age.as_millis()
    }

    /// Record an access.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.access_count += 1;
        self.last_accessed = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_not_expired() {
        let entry = CacheEntry::new("k", 1u32, Duration::from_secs(60), 4);
        assert!(!entry.is_expired(Utc::now()));
    }

    #[test]
    fn entry_expires_after_ttl() {
        let entry = CacheEntry::new("k", 1u32, Duration::from_millis(100), 4);
        let later = entry.created_at + chrono::Duration::milliseconds(100);
        assert!(entry.is_expired(later));
    }

    #[test]
    fn max_age_caps_long_ttl() {
        let entry = CacheEntry::new("k", 1u32, Duration::from_secs(3600), 4);
        let later = entry.created_at + chrono::Duration::seconds(120);
        assert!(!entry.is_expired(later));
        assert!(entry.exceeds_max_age(later, Duration::from_secs(60)));
    }

    #[test]
    fn touch_updates_bookkeeping() {
        let mut entry = CacheEntry::new("k", 1u32, Duration::from_secs(60), 4);
        let before = entry.last_accessed;
        let now = before + chrono::Duration::seconds(5);
        entry.touch(now);
        assert_eq!(entry.access_count, 1);
        assert_eq!(entry.last_accessed, now);
    }
}

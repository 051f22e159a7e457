use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};

use prewarm_cache::CacheStore;
use prewarm_core::config::CacheConfig;
use prewarm_core::errors::{CacheError, PrewarmError};
use prewarm_core::events::EngineEvent;
use prewarm_core::models::{InvalidationAction, InvalidationRule};

fn test_config(max_entries: usize) -> CacheConfig {
    CacheConfig {
        max_entries,
        default_ttl: Duration::from_secs(60),
        cleanup_interval: Duration::from_secs(3600),
        enable_persistence: false,
        ..Default::default()
    }
}

fn new_cache(max_entries: usize) -> CacheStore<Value> {
    CacheStore::new(test_config(max_entries)).unwrap()
}

// ── basic operations ──

#[test]
fn set_then_get_roundtrips() {
    let cache = new_cache(10);
    assert!(cache.set("k1", json!({"n": 1}), None));
    assert_eq!(cache.get("k1"), Some(json!({"n": 1})));
    assert!(cache.has("k1"));
    assert_eq!(cache.len(), 1);
    cache.destroy();
}

#[test]
fn get_missing_key_is_none() {
    let cache = new_cache(10);
    assert_eq!(cache.get("nope"), None);
    assert!(!cache.has("nope"));
    cache.destroy();
}

#[test]
fn delete_removes_and_reports() {
    let cache = new_cache(10);
    cache.set("k1", json!(1), None);
    assert!(cache.delete("k1"));
    assert!(!cache.delete("k1"));
    assert_eq!(cache.get("k1"), None);
    cache.destroy();
}

#[test]
fn set_replaces_existing_value() {
    let cache = new_cache(10);
    cache.set("k1", json!("old"), None);
    cache.set("k1", json!("new"), None);
    assert_eq!(cache.get("k1"), Some(json!("new")));
    assert_eq!(cache.len(), 1);
    cache.destroy();
}

#[test]
fn clear_empties_the_store() {
    let cache = new_cache(10);
    cache.set("a", json!(1), None);
    cache.set("b", json!(2), None);
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.metrics().total_size_bytes, 0);
    cache.destroy();
}

// ── expiry ──

#[test]
fn expired_entry_is_a_miss_and_is_removed() {
    let cache = new_cache(10);
    cache.set("k1", json!(1), Some(Duration::from_millis(20)));
    thread::sleep(Duration::from_millis(40));
    assert_eq!(cache.get("k1"), None);
    assert_eq!(cache.len(), 0);
    let metrics = cache.metrics();
    assert_eq!(metrics.misses, 1);
    assert_eq!(metrics.expirations, 1);
    cache.destroy();
}

#[test]
fn has_is_false_for_expired_entry() {
    let cache = new_cache(10);
    cache.set("k1", json!(1), Some(Duration::from_millis(20)));
    thread::sleep(Duration::from_millis(40));
    assert!(!cache.has("k1"));
    // `has` neither counts a lookup nor sweeps.
    assert_eq!(cache.metrics().misses, 0);
    assert_eq!(cache.len(), 1);
    cache.destroy();
}

#[test]
fn run_cleanup_sweeps_expired_entries() {
    let cache = new_cache(10);
    cache.set("short", json!(1), Some(Duration::from_millis(20)));
    cache.set("long", json!(2), Some(Duration::from_secs(60)));
    thread::sleep(Duration::from_millis(40));
    assert_eq!(cache.run_cleanup(), 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.has("long"));
    cache.destroy();
}

// ── LRU eviction ──

#[test]
fn full_cache_evicts_least_recently_used() {
    // Capacity 3 evicts batches of ceil(0.3) = 1.
    let cache = new_cache(3);
    cache.set("a", json!(1), None);
    thread::sleep(Duration::from_millis(5));
    cache.set("b", json!(2), None);
    thread::sleep(Duration::from_millis(5));
    cache.set("c", json!(3), None);
    thread::sleep(Duration::from_millis(5));

    // Touch a and c so b is the least recently used.
    cache.get("a");
    thread::sleep(Duration::from_millis(5));
    cache.get("c");
    thread::sleep(Duration::from_millis(5));

    cache.set("d", json!(4), None);
    assert!(!cache.has("b"));
    assert!(cache.has("a"));
    assert!(cache.has("c"));
    assert!(cache.has("d"));
    assert_eq!(cache.metrics().evictions, 1);
    cache.destroy();
}

#[test]
fn eviction_batch_is_ten_percent_of_capacity() {
    let cache = new_cache(20);
    for i in 0..20 {
        cache.set(&format!("k{i}"), json!(i), None);
        thread::sleep(Duration::from_millis(2));
    }
    cache.set("new", json!(99), None);
    // ceil(20 * 0.1) = 2 evicted, then one insert.
    assert_eq!(cache.len(), 19);
    assert_eq!(cache.metrics().evictions, 2);
    assert!(!cache.has("k0"));
    assert!(!cache.has("k1"));
    cache.destroy();
}

#[test]
fn replacing_a_key_does_not_evict() {
    let cache = new_cache(2);
    cache.set("a", json!(1), None);
    cache.set("b", json!(2), None);
    cache.set("a", json!(10), None);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.metrics().evictions, 0);
    cache.destroy();
}

// ── pattern invalidation ──

#[test]
fn invalidate_deletes_matching_keys() {
    let cache = new_cache(10);
    cache.set("user-1", json!(1), None);
    cache.set("user-2", json!(2), None);
    cache.set("session-1", json!(3), None);
    assert_eq!(cache.invalidate("^user-"), 2);
    assert!(!cache.has("user-1"));
    assert!(cache.has("session-1"));
    cache.destroy();
}

#[test]
fn invalid_pattern_invalidates_nothing() {
    let cache = new_cache(10);
    cache.set("k1", json!(1), None);
    assert_eq!(cache.invalidate("(["), 0);
    assert!(cache.has("k1"));
    cache.destroy();
}

// ── invalidation rules ──

#[test]
fn delete_rule_removes_matching_entries_on_sweep() {
    let cache = new_cache(10);
    cache.set("session-1", json!(1), None);
    cache.set("user-1", json!(2), None);
    cache
        .add_invalidation_rule(
            InvalidationRule::new("^session-", |_, _| true, InvalidationAction::Delete).unwrap(),
        );
    assert_eq!(cache.run_cleanup(), 1);
    assert!(!cache.has("session-1"));
    assert!(cache.has("user-1"));
    cache.destroy();
}

#[test]
fn refresh_rule_keeps_entry_and_requests_refresh() {
    let cache = new_cache(10);
    let requested = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&requested);
    cache.subscribe(move |event| {
        if let EngineEvent::RefreshRequested { key } = event {
            sink.lock().unwrap().push(key.clone());
        }
    });
    cache.set("report-1", json!(1), None);
    cache
        .add_invalidation_rule(
            InvalidationRule::new("^report-", |_, _| true, InvalidationAction::Refresh).unwrap(),
        );
    assert_eq!(cache.run_cleanup(), 0);
    assert!(cache.has("report-1"));
    assert_eq!(requested.lock().unwrap().as_slice(), ["report-1"]);
    cache.destroy();
}

#[test]
fn removed_rule_no_longer_fires() {
    let cache = new_cache(10);
    cache.set("tmp-1", json!(1), None);
    cache
        .add_invalidation_rule(
            InvalidationRule::new("^tmp-", |_, _| true, InvalidationAction::Delete).unwrap(),
        );
    assert!(cache.remove_invalidation_rule("^tmp-"));
    assert!(!cache.remove_invalidation_rule("^tmp-"));
    assert_eq!(cache.run_cleanup(), 0);
    assert!(cache.has("tmp-1"));
    cache.destroy();
}

// ── get_or_set ──

#[test]
fn get_or_set_runs_supplier_once_per_key() {
    let cache = new_cache(10);
    let runs = AtomicUsize::new(0);
    let v = cache
        .get_or_set(
            "k1",
            || {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(json!(42))
            },
            None,
        )
        .unwrap();
    assert_eq!(v, json!(42));
    let v = cache
        .get_or_set(
            "k1",
            || {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(json!(0))
            },
            None,
        )
        .unwrap();
    assert_eq!(v, json!(42));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    cache.destroy();
}

#[test]
fn concurrent_get_or_set_elects_a_single_supplier() {
    let cache = Arc::new(new_cache(10));
    let runs = Arc::new(AtomicUsize::new(0));
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let runs = Arc::clone(&runs);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache.get_or_set(
                    "hot",
                    || {
                        runs.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(50));
                        Ok(json!("computed"))
                    },
                    None,
                )
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), json!("computed"));
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    cache.destroy();
}

#[test]
fn failed_supplier_caches_nothing_and_allows_retry() {
    let cache = new_cache(10);
    let result = cache.get_or_set(
        "k1",
        || {
            Err(PrewarmError::Cache(CacheError::SupplierFailed {
                key: "k1".to_string(),
            }))
        },
        None,
    );
    assert!(result.is_err());
    assert!(!cache.has("k1"));

    let v = cache.get_or_set("k1", || Ok(json!(7)), None).unwrap();
    assert_eq!(v, json!(7));
    cache.destroy();
}

#[test]
fn refresh_recomputes_unconditionally() {
    let cache = new_cache(10);
    cache.set("k1", json!("stale"), None);
    let v = cache.refresh("k1", || Ok(json!("fresh")), None).unwrap();
    assert_eq!(v, json!("fresh"));
    assert_eq!(cache.get("k1"), Some(json!("fresh")));
    cache.destroy();
}

// ── metrics and events ──

#[test]
fn metrics_track_hits_misses_and_rate() {
    let cache = new_cache(10);
    cache.set("k1", json!(1), None);
    cache.get("k1");
    cache.get("k1");
    cache.get("k1");
    cache.get("absent");
    let metrics = cache.metrics();
    assert_eq!(metrics.hits, 3);
    assert_eq!(metrics.misses, 1);
    assert_eq!(metrics.sets, 1);
    assert!((metrics.hit_rate - 0.75).abs() < f64::EPSILON);
    assert_eq!(metrics.entry_count, 1);
    assert!(metrics.total_size_bytes > 0);
    cache.destroy();
}

#[test]
fn events_fire_for_mutations() {
    let cache = new_cache(10);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = cache.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    cache.set("k1", json!(1), None);
    cache.get("k1");
    cache.delete("k1");

    let events = seen.lock().unwrap().clone();
    assert!(matches!(events[0], EngineEvent::Set { ref key, .. } if key == "k1"));
    assert!(matches!(events[1], EngineEvent::Hit { ref key } if key == "k1"));
    assert!(matches!(events[2], EngineEvent::Delete { ref key } if key == "k1"));

    assert!(cache.unsubscribe(id));
    cache.destroy();
}

// ── lifecycle ──

#[test]
fn destroy_is_idempotent() {
    let cache = new_cache(10);
    cache.set("k1", json!(1), None);
    cache.destroy();
    cache.destroy();
    assert!(cache.is_empty());
}

#[test]
fn clones_share_the_same_store() {
    let cache = new_cache(10);
    let other = cache.clone();
    cache.set("k1", json!(1), None);
    assert_eq!(other.get("k1"), Some(json!(1)));
    assert_eq!(other.metrics().hits, 1);
    cache.destroy();
}

#[test]
fn invalid_config_fails_construction() {
    let config = CacheConfig {
        max_entries: 0,
        ..test_config(0)
    };
    assert!(CacheStore::<Value>::new(config).is_err());
}

proptest::proptest! {
    #[test]
    fn hit_rate_stays_in_bounds(ops in proptest::collection::vec(0u8..4, 1..40)) {
        let cache = new_cache(8);
        for (i, op) in ops.iter().enumerate() {
            let key = format!("k{}", i % 5);
            match *op {
                0 => {
                    cache.set(&key, json!(i), None);
                }
                1 => {
                    cache.get(&key);
                }
                2 => {
                    cache.delete(&key);
                }
                _ => {
                    cache.has(&key);
                }
            }
        }
        let metrics = cache.metrics();
        proptest::prop_assert!(metrics.hit_rate >= 0.0 && metrics.hit_rate <= 1.0);
        proptest::prop_assert!(metrics.hits + metrics.misses >= metrics.hits);
        cache.destroy();
    }
}

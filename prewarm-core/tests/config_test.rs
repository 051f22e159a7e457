use std::time::Duration;

use prewarm_core::config::{CacheConfig, PreloaderConfig};

#[test]
fn default_cache_config_is_valid() {
    let config = CacheConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.max_entries, 1000);
    assert_eq!(config.default_ttl, Duration::from_secs(300));
    assert_eq!(config.cleanup_interval, Duration::from_secs(60));
    assert_eq!(config.max_age, Duration::from_secs(3600));
}

#[test]
fn zero_max_entries_fails_fast() {
    let config = CacheConfig {
        max_entries: 0,
        ..Default::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("max_entries"));
}

#[test]
fn zero_cleanup_interval_fails_fast() {
    let config = CacheConfig {
        cleanup_interval: Duration::ZERO,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn zero_default_ttl_fails_fast() {
    let config = CacheConfig {
        default_ttl: Duration::ZERO,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn cache_config_roundtrips_through_json() {
    let config = CacheConfig {
        max_entries: 42,
        enable_compression: true,
        ..Default::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: CacheConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.max_entries, 42);
    assert!(back.enable_compression);
}

#[test]
fn partial_json_uses_defaults() {
    let back: CacheConfig = serde_json::from_str(r#"{"max_entries": 7}"#).unwrap();
    assert_eq!(back.max_entries, 7);
    assert_eq!(back.default_ttl, Duration::from_secs(300));
}

#[test]
fn default_preloader_config_matches_documented_values() {
    let config = PreloaderConfig::default();
    assert!(config.enable_pattern_analysis);
    assert!(config.enable_time_based_prediction);
    assert_eq!(config.max_predictions, 10);
    assert_eq!(config.prediction_cache_ttl, Duration::from_secs(300));
    assert_eq!(config.message_window, 20);
    assert_eq!(config.top_topics, 3);
}

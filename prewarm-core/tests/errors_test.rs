use prewarm_core::errors::*;

#[test]
fn cache_error_invalid_config_carries_reason() {
    let err = CacheError::InvalidConfig {
        reason: "max_entries must be > 0".into(),
    };
    assert!(err.to_string().contains("max_entries"));
}

#[test]
fn cache_error_serialization_carries_key() {
    let err = CacheError::Serialization {
        key: "response-42".into(),
        reason: "non-finite float".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("response-42"));
    assert!(msg.contains("non-finite float"));
}

#[test]
fn cache_error_supplier_failed_carries_key() {
    let err = CacheError::SupplierFailed {
        key: "hot-key".into(),
    };
    assert!(err.to_string().contains("hot-key"));
}

#[test]
fn pattern_error_carries_user_id() {
    let err = PatternError::HistoryUnavailable {
        user_id: "u-7".into(),
        reason: "source offline".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("u-7"));
    assert!(msg.contains("source offline"));
}

#[test]
fn preload_error_carries_target() {
    let err = PreloadError::ActionFailed {
        target: "professor".into(),
        reason: "cache rejected value".into(),
    };
    assert!(err.to_string().contains("professor"));
}

// --- From impls ---

#[test]
fn cache_error_converts_to_prewarm_error() {
    let err = CacheError::SupplierFailed { key: "k".into() };
    let top: PrewarmError = err.into();
    assert!(matches!(top, PrewarmError::Cache(_)));
}

#[test]
fn pattern_error_converts_to_prewarm_error() {
    let err = PatternError::HistoryUnavailable {
        user_id: "u".into(),
        reason: "r".into(),
    };
    let top: PrewarmError = err.into();
    assert!(matches!(top, PrewarmError::Pattern(_)));
}

#[test]
fn preload_error_converts_to_prewarm_error() {
    let err = PreloadError::ActionFailed {
        target: "t".into(),
        reason: "r".into(),
    };
    let top: PrewarmError = err.into();
    assert!(matches!(top, PrewarmError::Preload(_)));
}

#[test]
fn serde_json_error_converts_to_prewarm_error() {
    let json_err = serde_json::from_str::<String>("not valid json").unwrap_err();
    let top: PrewarmError = json_err.into();
    assert!(matches!(top, PrewarmError::Serialization(_)));
}

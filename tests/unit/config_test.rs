//! Tests for engine configuration parsing and validation

use priority_dispatch::config::EngineConfig;
use std::time::Duration;

#[test]
fn test_engine_config_defaults() {
    let cfg = EngineConfig::default();
    assert!(cfg.run_enabled);
    assert_eq!(cfg.between_time_ms, 0);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.between_time().unwrap(), Duration::ZERO);
}

#[test]
fn test_engine_config_from_json() {
    let cfg = EngineConfig::from_json_str(r#"{"run_enabled": false, "between_time_ms": 150}"#)
        .unwrap();
    assert!(!cfg.run_enabled);
    assert_eq!(cfg.between_time().unwrap(), Duration::from_millis(150));
}

#[test]
fn test_engine_config_json_missing_fields_use_defaults() {
    let cfg = EngineConfig::from_json_str(r#"{"between_time_ms": 5}"#).unwrap();
    assert!(cfg.run_enabled);
    assert_eq!(cfg.between_time_ms, 5);

    let cfg = EngineConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, EngineConfig::default());
}

#[test]
fn test_engine_config_rejects_negative_between_time() {
    let err = EngineConfig::from_json_str(r#"{"between_time_ms": -1}"#).unwrap_err();
    assert!(err.contains("non-negative"));

    let cfg = EngineConfig::new().with_between_time_ms(-10);
    assert!(cfg.validate().is_err());
    assert!(cfg.between_time().is_err());
}

#[test]
fn test_engine_config_rejects_malformed_json() {
    let err = EngineConfig::from_json_str(r#"{"run_enabled": "yes"}"#).unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_engine_config_serializes() {
    let cfg = EngineConfig::new()
        .with_run_enabled(false)
        .with_between_time_ms(40);
    let json = serde_json::to_value(&cfg).unwrap();
    assert_eq!(json["run_enabled"], false);
    assert_eq!(json["between_time_ms"], 40);
}

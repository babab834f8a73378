//! Tests for configuration validation

use prometheus_watchdog::config::WatchdogConfig;

#[test]
fn test_default_config_validation() {
    assert!(WatchdogConfig::default().validate().is_ok());
}

#[test]
fn test_config_invalid_capacity() {
    let invalid = WatchdogConfig::new().with_capacity(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_idle_timeout() {
    let invalid = WatchdogConfig::new().with_idle_timeout_ms(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_default_interval() {
    let invalid = WatchdogConfig::new().with_default_interval_ms(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_thread_name() {
    let invalid = WatchdogConfig::new().with_thread_name("  ");
    assert!(invalid.validate().is_err());
}

#[test]
fn test_zero_grace_period_allowed() {
    let cfg = WatchdogConfig::new().with_grace_period_ms(0);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "capacity": 64,
        "idle_timeout_ms": 30000,
        "grace_period_ms": 1000,
        "default_interval_ms": 5000,
        "thread_name": "hang-watch",
        "exit_code": 9
    }"#;

    let config = WatchdogConfig::from_json_str(json).unwrap();
    assert_eq!(config.capacity, 64);
    assert_eq!(config.thread_name, "hang-watch");
    assert_eq!(config.exit_code, 9);
}

#[test]
fn test_config_from_partial_json_uses_defaults() {
    let config = WatchdogConfig::from_json_str(r#"{ "capacity": 8 }"#).unwrap();
    assert_eq!(config.capacity, 8);
    assert_eq!(config.idle_timeout_ms, 60_000);
    assert_eq!(config.grace_period_ms, 3_000);
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(WatchdogConfig::from_json_str(r#"{ "capacity": 0 }"#).is_err());
    assert!(WatchdogConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_roundtrips_through_json() {
    let cfg = WatchdogConfig::new().with_capacity(32).with_thread_name("wd");
    let json = serde_json::to_string(&cfg).unwrap();
    assert_eq!(WatchdogConfig::from_json_str(&json).unwrap(), cfg);
}

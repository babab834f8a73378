//! Tests for error types

use prometheus_watchdog::core::WatchdogError;

#[test]
fn test_invalid_argument_error() {
    let err = WatchdogError::InvalidArgument("task name must not be empty".to_string());
    assert_eq!(format!("{}", err), "invalid argument: task name must not be empty");
}

#[test]
fn test_duplicate_name_error() {
    let err = WatchdogError::DuplicateName("main-loop".to_string());
    assert_eq!(format!("{}", err), "duplicate task name: main-loop");
}

#[test]
fn test_capacity_exceeded_error() {
    let err = WatchdogError::CapacityExceeded { capacity: 128 };
    assert_eq!(format!("{}", err), "capacity exceeded: limit is 128 tasks");
}

#[test]
fn test_stopped_error() {
    assert_eq!(format!("{}", WatchdogError::Stopped), "watchdog has been stopped");
}

#[test]
fn test_error_into_anyhow() {
    let res: prometheus_watchdog::core::AppResult<()> =
        Err(WatchdogError::Spawn("out of threads".into()).into());
    let msg = res.unwrap_err().to_string();
    assert_eq!(msg, "failed to spawn scheduler thread: out of threads");
}

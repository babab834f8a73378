//! Tests for the watchdog builder

use std::sync::Arc;

use prometheus_watchdog::builders::WatchdogBuilder;
use prometheus_watchdog::config::WatchdogConfig;
use prometheus_watchdog::core::{InMemoryDiagnosticSink, Lifecycle, Terminate, WatchdogError};

struct NoExit;

impl Terminate for NoExit {
    fn terminate(&self, _reason: &str) {}
}

#[test]
fn test_build_with_defaults() {
    let watchdog = WatchdogBuilder::new().build().unwrap();
    assert_eq!(watchdog.lifecycle(), Lifecycle::NotStarted);
    watchdog.shutdown();
}

#[test]
fn test_build_with_collaborators() {
    let watchdog = WatchdogBuilder::new()
        .config(WatchdogConfig::new().with_capacity(2))
        .sink(Arc::new(InMemoryDiagnosticSink::new(4)))
        .terminator(Arc::new(NoExit))
        .build()
        .unwrap();

    watchdog.run_once("a", || {}, 60_000);
    watchdog.run_once("b", || {}, 60_000);
    watchdog.run_once("c", || {}, 60_000);
    assert_eq!(watchdog.stats().queued_tasks, 2);
    watchdog.shutdown();
}

#[test]
fn test_build_rejects_invalid_config() {
    let result = WatchdogBuilder::new()
        .config(WatchdogConfig::new().with_capacity(0))
        .build();
    assert!(matches!(result, Err(WatchdogError::InvalidArgument(_))));
}

//! Tests for diagnostic sinks

use prometheus_watchdog::core::{
    build_diagnostic_event, DiagnosticSink, EventKind, InMemoryDiagnosticSink, ProcessIdentity,
    TracingSink,
};

fn identity() -> ProcessIdentity {
    ProcessIdentity {
        pid: 7,
        name: "render".to_string(),
    }
}

#[test]
fn test_in_memory_sink() {
    let sink = InMemoryDiagnosticSink::new(10);
    sink.report(build_diagnostic_event(
        EventKind::ServiceWarning,
        "T1",
        &identity(),
        "slow",
    ));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].module_name, "T1");
    assert_eq!(events[0].process_name, "render");
    assert_eq!(sink.count(EventKind::ServiceWarning), 1);
    assert_eq!(sink.count(EventKind::ServiceBlock), 0);
}

#[test]
fn test_in_memory_sink_overflow() {
    let sink = InMemoryDiagnosticSink::new(2);
    for name in ["a", "b", "c"] {
        sink.report(build_diagnostic_event(EventKind::ServiceBlock, name, &identity(), ""));
    }

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].module_name, "b"); // First one popped
    assert_eq!(events[1].module_name, "c");
}

#[test]
fn test_tracing_sink_accepts_both_kinds() {
    prometheus_watchdog::util::init_tracing();
    let sink = TracingSink;
    sink.report(build_diagnostic_event(EventKind::ServiceWarning, "T1", &identity(), "slow"));
    sink.report(build_diagnostic_event(EventKind::ServiceBlock, "T1", &identity(), "stuck"));
}

#[test]
fn test_event_serializes() {
    let ev = build_diagnostic_event(EventKind::ServiceBlock, "T1", &identity(), "stuck");
    let json = serde_json::to_value(&ev).unwrap();
    assert_eq!(json["kind"], "SERVICE_BLOCK");
    assert_eq!(json["pid"], 7);
}

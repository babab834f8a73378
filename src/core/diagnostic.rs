//! Diagnostic sink implementations.
//!
//! Hang reports leave the watchdog as [`DiagnosticEvent`]s. Sinks are
//! best-effort: `report` never fails and must return promptly, since it runs on
//! the scheduler thread right before a possible process termination.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::util::clock::wall_ms;

/// Severity of a hang report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// The monitored thread is slow but may recover.
    ServiceWarning,
    /// The monitored thread is considered stuck; termination follows.
    ServiceBlock,
}

/// Structured hang report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticEvent {
    /// Event identifier.
    pub event_id: String,
    /// Severity.
    pub kind: EventKind,
    /// Name of the task that produced the report.
    pub module_name: String,
    /// Reporting process name.
    pub process_name: String,
    /// Reporting process id.
    pub pid: u32,
    /// Human-readable description including the checker dump.
    pub message: String,
    /// Wall-clock timestamp in milliseconds.
    pub created_at_ms: u128,
}

/// Identity of the reporting process, captured once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    /// Process id.
    pub pid: u32,
    /// Executable name, or `"unknown"`.
    pub name: String,
}

impl ProcessIdentity {
    /// Read the identity of the current process.
    #[must_use]
    pub fn current() -> Self {
        let name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "unknown".to_string());
        Self {
            pid: std::process::id(),
            name,
        }
    }
}

/// Destination for hang reports.
pub trait DiagnosticSink: Send + Sync {
    /// Record an event. Must not block or panic.
    fn report(&self, event: DiagnosticEvent);
}

/// Default sink: forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, event: DiagnosticEvent) {
        match event.kind {
            EventKind::ServiceWarning => tracing::warn!(
                event_id = %event.event_id,
                module = %event.module_name,
                process = %event.process_name,
                pid = event.pid,
                "SERVICE_WARNING: {}",
                event.message
            ),
            EventKind::ServiceBlock => tracing::error!(
                event_id = %event.event_id,
                module = %event.module_name,
                process = %event.process_name,
                pid = event.pid,
                "SERVICE_BLOCK: {}",
                event.message
            ),
        }
    }
}

/// In-memory sink for testing and dev.
pub struct InMemoryDiagnosticSink {
    events: Mutex<VecDeque<DiagnosticEvent>>,
    max_events: usize,
}

impl InMemoryDiagnosticSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events)),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Number of stored events of the given kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.lock().iter().filter(|e| e.kind == kind).count()
    }
}

impl DiagnosticSink for InMemoryDiagnosticSink {
    fn report(&self, event: DiagnosticEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Helper to build a diagnostic event for the given process.
pub fn build_diagnostic_event(
    kind: EventKind,
    module_name: impl Into<String>,
    identity: &ProcessIdentity,
    message: impl Into<String>,
) -> DiagnosticEvent {
    DiagnosticEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        kind,
        module_name: module_name.into(),
        process_name: identity.name.clone(),
        pid: identity.pid,
        message: message.into(),
        created_at_ms: wall_ms(),
    }
}

//! Escalation policy for unanswered liveness probes.
//!
//! A half-blocked probe produces a `ServiceWarning`. A fully blocked probe
//! produces a `ServiceBlock`, waits out the grace period so the report can
//! flush, and then terminates the process. A registrant-supplied timeout
//! callback replaces both default paths, and termination is skipped entirely.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{error, warn};

use super::checker::{CheckState, LivenessChecker};
use super::diagnostic::{build_diagnostic_event, DiagnosticSink, EventKind, ProcessIdentity};
use super::task::TimeoutCallback;

/// Fail-fast capability invoked when a monitored thread is stuck.
pub trait Terminate: Send + Sync {
    /// End the process. The default implementation never returns.
    fn terminate(&self, reason: &str);
}

/// Default terminator: exits the process without unwinding.
#[derive(Debug, Clone, Copy)]
pub struct ProcessExit {
    code: i32,
}

impl ProcessExit {
    /// Exit with the given status code.
    #[must_use]
    pub const fn new(code: i32) -> Self {
        Self { code }
    }
}

impl Default for ProcessExit {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Terminate for ProcessExit {
    fn terminate(&self, reason: &str) {
        error!(code = self.code, "watchdog terminating process: {reason}");
        std::process::exit(self.code);
    }
}

/// Everything the scheduler needs to act on a probe result.
#[derive(Clone)]
pub struct Escalation {
    sink: Arc<dyn DiagnosticSink>,
    terminator: Arc<dyn Terminate>,
    grace_period: Duration,
    identity: ProcessIdentity,
}

impl Escalation {
    /// Build an escalation policy.
    pub fn new(
        sink: Arc<dyn DiagnosticSink>,
        terminator: Arc<dyn Terminate>,
        grace_period: Duration,
    ) -> Self {
        Self {
            sink,
            terminator,
            grace_period,
            identity: ProcessIdentity::current(),
        }
    }

    /// Poll `checker` and escalate according to its state.
    ///
    /// `interval_ms` is the task's monitoring interval; the tolerated window is
    /// two intervals.
    pub fn evaluate(
        &self,
        name: &str,
        checker: &dyn LivenessChecker,
        on_timeout: Option<&TimeoutCallback>,
        interval_ms: u64,
    ) -> CheckState {
        let state = checker.check_state();
        match state {
            CheckState::Completed => {}
            CheckState::HalfBlocked => {
                let description = describe(name, interval_ms, checker);
                warn!(task = %name, "liveness probe half blocked");
                if let Some(cb) = on_timeout {
                    cb(name, state);
                } else {
                    self.report(EventKind::ServiceWarning, name, description);
                }
            }
            CheckState::Blocked => {
                let description = describe(name, interval_ms.saturating_mul(2), checker);
                error!(task = %name, "liveness probe blocked");
                if let Some(cb) = on_timeout {
                    cb(name, state);
                } else {
                    self.report(EventKind::ServiceBlock, name, description.clone());
                    thread::sleep(self.grace_period);
                    self.terminator.terminate(&description);
                }
            }
        }
        state
    }

    /// Deliver to the sink. A panicking sink is logged and otherwise ignored.
    fn report(&self, kind: EventKind, name: &str, message: String) {
        let event = build_diagnostic_event(kind, name, &self.identity, message);
        if panic::catch_unwind(AssertUnwindSafe(|| self.sink.report(event))).is_err() {
            error!(task = %name, kind = ?kind, "diagnostic sink panicked");
        }
    }
}

/// Hang description with the window as seconds to one decimal place.
fn describe(name: &str, window_ms: u64, checker: &dyn LivenessChecker) -> String {
    let dump = panic::catch_unwind(AssertUnwindSafe(|| checker.dump_info()))
        .unwrap_or_else(|_| "<dump_info panicked>".to_string());
    format!(
        "Watchdog: thread({name}) blocked {}.{}s\n{dump}",
        window_ms / 1000,
        window_ms % 1000 / 100
    )
}

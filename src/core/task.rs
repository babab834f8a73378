//! Task model: the unit the scheduler orders by deadline and executes.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error};

use super::checker::{CheckState, LivenessChecker};
use super::escalation::Escalation;

/// Unique task identifier assigned at insertion.
pub type TaskId = u64;

/// Callback invoked instead of the default escalation path.
pub type TimeoutCallback = Arc<dyn Fn(&str, CheckState) + Send + Sync>;

/// Zero-argument action run by a callback task.
pub trait Action: Send {
    /// Run the action once.
    fn invoke(&mut self);
}

impl<F> Action for F
where
    F: FnMut() + Send,
{
    fn invoke(&mut self) {
        self();
    }
}

/// What a task does when it comes due.
pub enum TaskKind {
    /// Probe a monitored thread through its checker.
    LivenessCheck {
        /// Checker bound to the monitored thread.
        checker: Arc<dyn LivenessChecker>,
        /// Optional override for the default escalation path.
        on_timeout: Option<TimeoutCallback>,
    },
    /// Run an arbitrary action.
    Callback {
        /// The action.
        action: Box<dyn Action>,
    },
}

impl fmt::Debug for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LivenessCheck { on_timeout, .. } => f
                .debug_struct("LivenessCheck")
                .field("custom_timeout", &on_timeout.is_some())
                .finish(),
            Self::Callback { .. } => f.write_str("Callback"),
        }
    }
}

/// How a call to [`Task::run`] went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The task body ran.
    Executed,
    /// The drift guard fired; the body was skipped and the deadline reset.
    Skipped,
}

/// A scheduled unit of work.
#[derive(Debug)]
pub struct Task {
    pub(crate) id: TaskId,
    pub(crate) name: String,
    pub(crate) kind: TaskKind,
    pub(crate) interval_ms: u64,
    pub(crate) next_deadline_ms: u64,
    pub(crate) check_outstanding: bool,
    pub(crate) oneshot: bool,
}

impl Task {
    /// Liveness task; due immediately so the first probe goes out on the next
    /// scheduler iteration.
    pub fn liveness(
        name: impl Into<String>,
        checker: Arc<dyn LivenessChecker>,
        on_timeout: Option<TimeoutCallback>,
        interval_ms: u64,
        now_ms: u64,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            kind: TaskKind::LivenessCheck {
                checker,
                on_timeout,
            },
            interval_ms,
            next_deadline_ms: now_ms,
            check_outstanding: false,
            oneshot: false,
        }
    }

    /// One-shot callback due after `delay_ms`.
    pub fn oneshot(
        name: impl Into<String>,
        action: impl Action + 'static,
        delay_ms: u64,
        now_ms: u64,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            kind: TaskKind::Callback {
                action: Box::new(action),
            },
            interval_ms: 0,
            next_deadline_ms: now_ms.saturating_add(delay_ms),
            check_outstanding: false,
            oneshot: true,
        }
    }

    /// Repeating callback, first due after `delay_ms`.
    pub fn periodic(
        name: impl Into<String>,
        action: impl Action + 'static,
        interval_ms: u64,
        delay_ms: u64,
        now_ms: u64,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            kind: TaskKind::Callback {
                action: Box::new(action),
            },
            interval_ms,
            next_deadline_ms: now_ms.saturating_add(delay_ms),
            check_outstanding: false,
            oneshot: false,
        }
    }

    /// Task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute monotonic deadline in milliseconds.
    #[must_use]
    pub const fn next_deadline_ms(&self) -> u64 {
        self.next_deadline_ms
    }

    /// Repeat interval; zero for one-shot tasks.
    #[must_use]
    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Whether the task was created through the one-shot API.
    #[must_use]
    pub const fn is_oneshot(&self) -> bool {
        self.oneshot
    }

    /// Whether a probe has been dispatched and not yet answered.
    #[must_use]
    pub const fn check_outstanding(&self) -> bool {
        self.check_outstanding
    }

    /// Whether the task goes back into the queue after running.
    #[must_use]
    pub const fn is_periodic(&self) -> bool {
        self.interval_ms > 0 && !self.oneshot
    }

    /// Execute the task at `now_ms`.
    ///
    /// If the scheduler itself stalled for more than two intervals, the body
    /// is skipped and the deadline is reset to `now_ms` so the pause is not
    /// reported as a hang.
    pub fn run(&mut self, now_ms: u64, escalation: &Escalation) -> RunOutcome {
        if self.interval_ms > 0
            && now_ms.saturating_sub(self.next_deadline_ms) > self.interval_ms.saturating_mul(2)
        {
            debug!(
                task = %self.name,
                late_ms = now_ms - self.next_deadline_ms,
                "scheduler drift detected, skipping tick"
            );
            self.next_deadline_ms = now_ms;
            self.check_outstanding = false;
            return RunOutcome::Skipped;
        }

        match &mut self.kind {
            TaskKind::Callback { action } => {
                let result = panic::catch_unwind(AssertUnwindSafe(|| action.invoke()));
                if result.is_err() {
                    error!(task = %self.name, "task callback panicked");
                }
            }
            TaskKind::LivenessCheck {
                checker,
                on_timeout,
            } => {
                if self.check_outstanding {
                    let state = escalation.evaluate(
                        &self.name,
                        checker.as_ref(),
                        on_timeout.as_ref(),
                        self.interval_ms,
                    );
                    // Answered: re-probe on this same tick so a healthy thread
                    // is probed once per interval, not once per two.
                    if state == CheckState::Completed {
                        self.check_outstanding = false;
                    }
                }
                if !self.check_outstanding {
                    checker.schedule_check();
                    self.check_outstanding = true;
                }
            }
        }
        RunOutcome::Executed
    }

    /// Move the deadline one interval forward on the fixed grid.
    pub(crate) const fn advance(&mut self) {
        self.next_deadline_ms = self.next_deadline_ms.saturating_add(self.interval_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostic::{EventKind, InMemoryDiagnosticSink};
    use crate::core::escalation::Terminate;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct ScriptedChecker {
        scheduled: AtomicUsize,
        states: Mutex<VecDeque<CheckState>>,
    }

    impl ScriptedChecker {
        fn with_states(states: &[CheckState]) -> Arc<Self> {
            Arc::new(Self {
                scheduled: AtomicUsize::new(0),
                states: Mutex::new(states.iter().copied().collect()),
            })
        }
    }

    impl LivenessChecker for ScriptedChecker {
        fn schedule_check(&self) {
            self.scheduled.fetch_add(1, Ordering::SeqCst);
        }
        fn check_state(&self) -> CheckState {
            self.states.lock().pop_front().unwrap_or(CheckState::Completed)
        }
        fn dump_info(&self) -> String {
            String::new()
        }
    }

    struct NoExit;

    impl Terminate for NoExit {
        fn terminate(&self, _reason: &str) {}
    }

    fn escalation() -> (Escalation, Arc<InMemoryDiagnosticSink>) {
        let sink = Arc::new(InMemoryDiagnosticSink::new(16));
        let esc = Escalation::new(sink.clone(), Arc::new(NoExit), Duration::ZERO);
        (esc, sink)
    }

    #[test]
    fn test_liveness_first_tick_dispatches_probe() {
        let (esc, _) = escalation();
        let checker = ScriptedChecker::with_states(&[]);
        let mut task = Task::liveness("T1", checker.clone(), None, 1000, 500);
        assert_eq!(task.next_deadline_ms(), 500);

        assert_eq!(task.run(500, &esc), RunOutcome::Executed);
        assert_eq!(checker.scheduled.load(Ordering::SeqCst), 1);
        assert!(task.check_outstanding());
    }

    #[test]
    fn test_liveness_pending_probe_keeps_outstanding() {
        let (esc, sink) = escalation();
        let checker = ScriptedChecker::with_states(&[CheckState::HalfBlocked]);
        let mut task = Task::liveness("T1", checker.clone(), None, 1000, 0);

        task.run(0, &esc);
        task.advance();
        task.run(1000, &esc);

        assert!(task.check_outstanding());
        assert_eq!(checker.scheduled.load(Ordering::SeqCst), 1);
        assert_eq!(sink.count(EventKind::ServiceWarning), 1);
    }

    #[test]
    fn test_liveness_completed_probe_dispatches_next() {
        let (esc, sink) = escalation();
        let checker = ScriptedChecker::with_states(&[CheckState::Completed]);
        let mut task = Task::liveness("T1", checker.clone(), None, 1000, 0);

        task.run(0, &esc);
        task.advance();
        task.run(1000, &esc);

        assert!(task.check_outstanding());
        assert_eq!(checker.scheduled.load(Ordering::SeqCst), 2);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_drift_guard_skips_and_resets() {
        let (esc, _) = escalation();
        let checker = ScriptedChecker::with_states(&[CheckState::Blocked]);
        let mut task = Task::liveness("T1", checker.clone(), None, 1000, 0);
        task.run(0, &esc);
        task.advance();

        // Stalled well past two intervals.
        assert_eq!(task.run(3500, &esc), RunOutcome::Skipped);
        assert_eq!(task.next_deadline_ms(), 3500);
        assert!(!task.check_outstanding());
        assert_eq!(checker.scheduled.load(Ordering::SeqCst), 1);
        // The scripted Blocked state was never consumed.
        assert_eq!(checker.states.lock().len(), 1);
    }

    #[test]
    fn test_drift_guard_boundary_is_exclusive() {
        let (esc, _) = escalation();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_cb = hits.clone();
        let mut task = Task::periodic(
            "p",
            move || {
                hits_cb.fetch_add(1, Ordering::SeqCst);
            },
            100,
            0,
            0,
        );
        assert_eq!(task.run(200, &esc), RunOutcome::Executed);
        assert_eq!(task.run(201, &esc), RunOutcome::Skipped);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_oneshot_never_drift_skipped() {
        let (esc, _) = escalation();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_cb = hits.clone();
        let mut task = Task::oneshot(
            "o",
            move || {
                hits_cb.fetch_add(1, Ordering::SeqCst);
            },
            10,
            0,
        );
        assert!(!task.is_periodic());
        assert_eq!(task.run(1_000_000, &esc), RunOutcome::Executed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_advance_is_grid_aligned() {
        let mut task = Task::periodic("p", || {}, 250, 100, 1000);
        assert_eq!(task.next_deadline_ms(), 1100);
        task.advance();
        task.advance();
        assert_eq!(task.next_deadline_ms(), 1600);
    }

    #[test]
    fn test_panicking_callback_is_contained() {
        let (esc, _) = escalation();
        let mut task = Task::oneshot("boom", || panic!("boom"), 0, 0);
        assert_eq!(task.run(0, &esc), RunOutcome::Executed);
    }
}

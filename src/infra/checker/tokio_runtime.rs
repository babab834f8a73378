//! Liveness checker for a tokio runtime.
//!
//! Probes by spawning a trivial task on the runtime. If every worker is stuck
//! in blocking code, the task is never polled and the probe stays pending.

use std::sync::Arc;

use tokio::runtime::Handle;

use super::probe::ProbeState;
use crate::core::{CheckState, LivenessChecker};

/// Checker bound to one tokio runtime.
pub struct TokioRuntimeChecker {
    label: String,
    handle: Handle,
    probe: Arc<ProbeState>,
}

impl TokioRuntimeChecker {
    /// Bind a checker to the runtime behind `handle`.
    pub fn new(label: impl Into<String>, handle: Handle) -> Self {
        Self {
            label: label.into(),
            handle,
            probe: Arc::new(ProbeState::new()),
        }
    }

    /// Bind a checker to the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn current(label: impl Into<String>) -> Self {
        Self::new(label, Handle::current())
    }
}

impl LivenessChecker for TokioRuntimeChecker {
    fn schedule_check(&self) {
        let generation = self.probe.arm();
        let probe = Arc::clone(&self.probe);
        drop(self.handle.spawn(async move {
            probe.complete(generation);
        }));
    }

    fn check_state(&self) -> CheckState {
        self.probe.poll()
    }

    fn dump_info(&self) -> String {
        let metrics = self.handle.metrics();
        let waiting = self
            .probe
            .pending_for_ms()
            .map_or_else(|| "answered".to_string(), |ms| format!("pending for {ms}ms"));
        format!(
            "tokio runtime `{}`: {} workers, {} alive tasks, probe {waiting}",
            self.label,
            metrics.num_workers(),
            metrics.num_alive_tasks()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_responsive_runtime_completes() {
        let checker = TokioRuntimeChecker::current("main");
        checker.schedule_check();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(checker.check_state(), CheckState::Completed);
        assert!(checker.dump_info().contains("2 workers"));
    }

    #[test]
    fn test_undriven_runtime_escalates() {
        // A current-thread runtime only polls tasks inside block_on.
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let checker = TokioRuntimeChecker::new("idle", rt.handle().clone());
        checker.schedule_check();
        assert_eq!(checker.check_state(), CheckState::HalfBlocked);
        assert_eq!(checker.check_state(), CheckState::Blocked);

        rt.block_on(async { tokio::time::sleep(Duration::from_millis(20)).await });
        assert_eq!(checker.check_state(), CheckState::Completed);
    }
}

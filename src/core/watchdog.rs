//! Public watchdog facade.
//!
//! Thin synchronous calls into the [`Registry`]. Liveness registration reports
//! failures to the caller; the callback entry points are fire-and-forget and
//! only log a rejected task.

use std::sync::Arc;

use tracing::warn;

use crate::config::WatchdogConfig;
use crate::util::clock::now_ms;

use super::checker::LivenessChecker;
use super::diagnostic::{DiagnosticSink, TracingSink};
use super::error::WatchdogError;
use super::escalation::{Escalation, ProcessExit, Terminate};
use super::registry::{Lifecycle, Registry, WatchdogStats};
use super::task::{Action, Task, TimeoutCallback};

/// Process hang detector and shared timer.
///
/// # Example
///
/// ```rust,no_run
/// use prometheus_watchdog::config::WatchdogConfig;
/// use prometheus_watchdog::core::Watchdog;
///
/// let watchdog = Watchdog::from_config(WatchdogConfig::default())?;
/// watchdog.run_periodic("flush-metrics", || { /* ... */ }, 5_000, 0);
/// watchdog.run_once("warmup", || { /* ... */ }, 100);
/// watchdog.shutdown();
/// # Ok::<(), prometheus_watchdog::core::WatchdogError>(())
/// ```
pub struct Watchdog {
    registry: Registry,
    default_interval_ms: u64,
}

impl Watchdog {
    /// Create a watchdog with explicit diagnostic and termination capabilities.
    ///
    /// # Errors
    ///
    /// Returns `WatchdogError::InvalidArgument` if the configuration is invalid.
    pub fn new(
        config: WatchdogConfig,
        sink: Arc<dyn DiagnosticSink>,
        terminator: Arc<dyn Terminate>,
    ) -> Result<Self, WatchdogError> {
        config
            .validate()
            .map_err(|e| WatchdogError::InvalidArgument(format!("config invalid: {e}")))?;
        let escalation = Escalation::new(sink, terminator, config.grace_period());
        Ok(Self {
            registry: Registry::new(&config, escalation),
            default_interval_ms: config.default_interval_ms,
        })
    }

    /// Create a watchdog that reports through `tracing` and exits the process
    /// on a confirmed hang.
    ///
    /// # Errors
    ///
    /// Returns `WatchdogError::InvalidArgument` if the configuration is invalid.
    pub fn from_config(config: WatchdogConfig) -> Result<Self, WatchdogError> {
        let terminator = Arc::new(ProcessExit::new(config.exit_code));
        Self::new(config, Arc::new(TracingSink), terminator)
    }

    /// Start monitoring a thread through `checker` every `interval_ms`.
    ///
    /// The first probe is dispatched immediately. With `on_timeout` set, the
    /// callback receives half-blocked and blocked results and the process is
    /// never terminated on this task's behalf.
    ///
    /// # Errors
    ///
    /// Empty name, zero interval, duplicate name, capacity, or stopped.
    pub fn register_liveness_task(
        &self,
        name: &str,
        checker: Arc<dyn LivenessChecker>,
        on_timeout: Option<TimeoutCallback>,
        interval_ms: u64,
    ) -> Result<(), WatchdogError> {
        let task = Task::liveness(name, checker, on_timeout, interval_ms, now_ms());
        self.registry.insert(task).map(|_| ()).inspect_err(|e| {
            warn!(task = %name, error = %e, "liveness task rejected");
        })
    }

    /// [`Watchdog::register_liveness_task`] with the configured default
    /// interval and no custom timeout callback.
    ///
    /// # Errors
    ///
    /// Same as [`Watchdog::register_liveness_task`].
    pub fn register_liveness_task_default(
        &self,
        name: &str,
        checker: Arc<dyn LivenessChecker>,
    ) -> Result<(), WatchdogError> {
        self.register_liveness_task(name, checker, None, self.default_interval_ms)
    }

    /// Run `action` once on the scheduler thread after `delay_ms`.
    ///
    /// One-shot names are not deduplicated.
    pub fn run_once<A>(&self, name: &str, action: A, delay_ms: u64)
    where
        A: Action + 'static,
    {
        let task = Task::oneshot(name, action, delay_ms, now_ms());
        if let Err(e) = self.registry.insert(task) {
            warn!(task = %name, error = %e, "one-shot task rejected");
        }
    }

    /// Run `action` every `interval_ms`, first after `delay_ms`.
    pub fn run_periodic<A>(&self, name: &str, action: A, interval_ms: u64, delay_ms: u64)
    where
        A: Action + 'static,
    {
        let task = Task::periodic(name, action, interval_ms, delay_ms, now_ms());
        if let Err(e) = self.registry.insert(task) {
            warn!(task = %name, error = %e, "periodic task rejected");
        }
    }

    /// Stop a periodic or liveness task by name.
    pub fn remove_task(&self, name: &str) -> bool {
        self.registry.remove(name)
    }

    /// Stop the scheduler; queued tasks are discarded. Idempotent.
    pub fn shutdown(&self) {
        self.registry.stop();
    }

    /// Current scheduler lifecycle.
    pub fn lifecycle(&self) -> Lifecycle {
        self.registry.lifecycle()
    }

    /// Get a snapshot of scheduler state.
    pub fn stats(&self) -> WatchdogStats {
        self.registry.stats()
    }
}

//! Task registry and the scheduler loop that drains it.
//!
//! # Design
//!
//! - **Single lock**: queue, dedup map and lifecycle share one
//!   `parking_lot::Mutex`; a `Condvar` wakes the scheduler on earlier
//!   insertions and on stop.
//! - **Single executor**: only the scheduler thread runs task bodies, so at
//!   most one task runs at a time and task fields need no extra locking.
//! - **Lazy start, no restart**: the thread starts on the first insert.
//!   Stopping is terminal.
//! - **Capacity**: admission is refused once the queue holds `capacity`
//!   tasks. The task being executed is off the queue, so its re-enqueue can
//!   briefly leave `capacity + 1` tasks queued; no insert succeeds until the
//!   queue drops below the limit again.
//! - **Panics stay on the task**: a panic anywhere in a task body, checker,
//!   timeout callback or sink is caught around the tick, and the task is
//!   rescheduled as usual.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::WatchdogConfig;
use crate::infra::queue::DeadlineQueue;
use crate::util::clock::{millis, now_ms};

use super::error::WatchdogError;
use super::escalation::Escalation;
use super::task::{RunOutcome, Task, TaskId};

/// Scheduler thread lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// No task has been inserted yet.
    #[default]
    NotStarted,
    /// The scheduler thread is running.
    Running,
    /// Stopped for good.
    Stopped,
}

/// Snapshot of registry state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchdogStats {
    /// Scheduler lifecycle.
    pub lifecycle: Lifecycle,
    /// Tasks waiting in the queue.
    pub queued_tasks: usize,
    /// Names held by active periodic tasks.
    pub active_names: usize,
    /// Task bodies executed.
    pub executed_ticks: u64,
    /// Ticks skipped by the drift guard.
    pub skipped_ticks: u64,
}

struct Inner {
    queue: DeadlineQueue,
    /// Name of every queued or executing periodic task, mapped to its id.
    active: HashMap<String, TaskId>,
    lifecycle: Lifecycle,
    worker: Option<JoinHandle<()>>,
    next_id: TaskId,
}

struct Shared {
    inner: Mutex<Inner>,
    wake: Condvar,
    escalation: Escalation,
    capacity: usize,
    idle_timeout: Duration,
    executed_ticks: AtomicU64,
    skipped_ticks: AtomicU64,
}

/// Owns the deadline queue and the scheduler thread.
pub struct Registry {
    shared: Arc<Shared>,
    thread_name: String,
}

impl Registry {
    /// Create a registry. The scheduler thread is not started until the
    /// first successful [`Registry::insert`].
    #[must_use]
    pub fn new(config: &WatchdogConfig, escalation: Escalation) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    queue: DeadlineQueue::with_capacity(config.capacity),
                    active: HashMap::new(),
                    lifecycle: Lifecycle::NotStarted,
                    worker: None,
                    next_id: 1,
                }),
                wake: Condvar::new(),
                escalation,
                capacity: config.capacity,
                idle_timeout: config.idle_timeout(),
                executed_ticks: AtomicU64::new(0),
                skipped_ticks: AtomicU64::new(0),
            }),
            thread_name: config.thread_name.clone(),
        }
    }

    /// Admit a task.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty name, or a periodic task with a zero interval
    /// - `Stopped` once [`Registry::stop`] has run
    /// - `DuplicateName` if a periodic task with the same name is active
    /// - `CapacityExceeded` if the registry is full
    /// - `Spawn` if the scheduler thread could not be started
    pub fn insert(&self, mut task: Task) -> Result<TaskId, WatchdogError> {
        if task.name.trim().is_empty() {
            return Err(WatchdogError::InvalidArgument(
                "task name must not be empty".into(),
            ));
        }
        if !task.oneshot && task.interval_ms == 0 {
            return Err(WatchdogError::InvalidArgument(format!(
                "periodic task `{}` needs a non-zero interval",
                task.name
            )));
        }

        let mut inner = self.shared.inner.lock();
        if inner.lifecycle == Lifecycle::Stopped {
            return Err(WatchdogError::Stopped);
        }
        if !task.oneshot && inner.active.contains_key(&task.name) {
            return Err(WatchdogError::DuplicateName(task.name));
        }
        if inner.queue.len() >= self.shared.capacity {
            return Err(WatchdogError::CapacityExceeded {
                capacity: self.shared.capacity,
            });
        }
        if inner.lifecycle == Lifecycle::NotStarted {
            self.start(&mut inner)?;
        }

        task.id = inner.next_id;
        inner.next_id += 1;
        if !task.oneshot {
            inner.active.insert(task.name.clone(), task.id);
        }
        let becomes_earliest = inner
            .queue
            .peek_deadline()
            .is_none_or(|d| task.next_deadline_ms < d);

        debug!(
            task = %task.name,
            id = task.id,
            kind = ?task.kind,
            interval_ms = task.interval_ms,
            deadline_ms = task.next_deadline_ms,
            "task inserted"
        );
        let id = task.id;
        inner.queue.push(task);
        drop(inner);

        if becomes_earliest {
            self.shared.wake.notify_one();
        }
        Ok(id)
    }

    /// Drop a queued periodic task by name. Returns `false` if no periodic
    /// task with that name is active.
    ///
    /// A task that is executing when this is called finishes its current run
    /// and is then discarded.
    pub fn remove(&self, name: &str) -> bool {
        let mut inner = self.shared.inner.lock();
        let Some(id) = inner.active.remove(name) else {
            return false;
        };
        let removed = inner.queue.remove_where(|t| t.id == id);
        debug!(task = %name, removed, "periodic task removed");
        true
    }

    /// Stop the scheduler and discard queued tasks without running them.
    ///
    /// Idempotent and safe to call before the scheduler ever started. Blocks
    /// until a task body that is currently executing returns.
    pub fn stop(&self) {
        let (discarded, worker) = {
            let mut inner = self.shared.inner.lock();
            if inner.lifecycle == Lifecycle::Stopped {
                return;
            }
            inner.lifecycle = Lifecycle::Stopped;
            inner.active.clear();
            (inner.queue.drain(), inner.worker.take())
        };
        self.shared.wake.notify_all();

        if let Some(worker) = worker {
            if worker.thread().id() == thread::current().id() {
                debug!("stop requested from the scheduler thread, not joining");
            } else if worker.join().is_err() {
                warn!("scheduler thread panicked");
            }
        }
        info!(discarded = discarded.len(), "watchdog stopped");
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.shared.inner.lock().lifecycle
    }

    /// Get a snapshot of registry state.
    pub fn stats(&self) -> WatchdogStats {
        let inner = self.shared.inner.lock();
        WatchdogStats {
            lifecycle: inner.lifecycle,
            queued_tasks: inner.queue.len(),
            active_names: inner.active.len(),
            executed_ticks: self.shared.executed_ticks.load(Ordering::Relaxed),
            skipped_ticks: self.shared.skipped_ticks.load(Ordering::Relaxed),
        }
    }

    fn start(&self, inner: &mut Inner) -> Result<(), WatchdogError> {
        let shared = Arc::clone(&self.shared);
        let worker = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || scheduler_loop(&shared))
            .map_err(|e| WatchdogError::Spawn(e.to_string()))?;
        inner.worker = Some(worker);
        inner.lifecycle = Lifecycle::Running;
        info!(
            thread = %self.thread_name,
            capacity = self.shared.capacity,
            "watchdog scheduler started"
        );
        Ok(())
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        // Signal the scheduler but don't join; explicit stop() is required
        // for a graceful join.
        let mut inner = self.shared.inner.lock();
        if inner.lifecycle != Lifecycle::Stopped {
            inner.lifecycle = Lifecycle::Stopped;
            drop(inner);
            self.shared.wake.notify_all();
            debug!("Registry dropped without explicit stop - scheduler thread detached");
        }
    }
}

fn scheduler_loop(shared: &Shared) {
    debug!("scheduler loop started");
    while let Some((mut task, now)) = next_due(shared) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.run(now, &shared.escalation)))
            .unwrap_or_else(|_| {
                error!(task = %task.name, "task panicked on the scheduler thread");
                RunOutcome::Executed
            });
        match outcome {
            RunOutcome::Executed => shared.executed_ticks.fetch_add(1, Ordering::Relaxed),
            RunOutcome::Skipped => shared.skipped_ticks.fetch_add(1, Ordering::Relaxed),
        };
        reschedule(shared, task);
    }
    debug!("scheduler loop exiting");
}

/// Block until the earliest task is due and pop it, or return `None` once
/// the registry is stopped.
fn next_due(shared: &Shared) -> Option<(Task, u64)> {
    let mut inner = shared.inner.lock();
    loop {
        let now = now_ms();
        if inner.lifecycle == Lifecycle::Stopped {
            let discarded = inner.queue.drain();
            inner.active.clear();
            drop(inner);
            debug!(discarded = discarded.len(), "queue drained on stop");
            return None;
        }
        match inner.queue.peek_deadline() {
            None => {
                shared.wake.wait_for(&mut inner, shared.idle_timeout);
            }
            Some(deadline) if deadline > now => {
                shared.wake.wait_for(&mut inner, millis(deadline - now));
            }
            Some(_) => {
                if let Some(task) = inner.queue.pop() {
                    return Some((task, now));
                }
            }
        }
    }
}

fn reschedule(shared: &Shared, mut task: Task) {
    let mut inner = shared.inner.lock();
    if inner.lifecycle == Lifecycle::Stopped || !task.is_periodic() {
        return;
    }
    if inner.active.get(&task.name) != Some(&task.id) {
        debug!(task = %task.name, "task removed while running, not rescheduled");
        return;
    }
    task.advance();
    inner.queue.push(task);
}

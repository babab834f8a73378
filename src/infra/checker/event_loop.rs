//! Channel-driven event loop and its liveness checker.
//!
//! [`EventLoop`] is the shape of thread a watchdog usually guards: a named OS
//! thread that drains a job queue forever. [`EventLoopChecker`] probes it by
//! posting a job that marks the current probe as answered; if the loop is
//! wedged inside an earlier job, the probe stays pending.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::probe::ProbeState;
use crate::core::{CheckState, LivenessChecker};

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Run(Job),
    Stop,
}

/// Cloneable posting handle for an [`EventLoop`].
#[derive(Clone)]
pub struct EventLoopHandle {
    name: Arc<str>,
    tx: Sender<Message>,
}

impl EventLoopHandle {
    /// Post a job. Returns `false` if the loop has exited.
    pub fn post<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx.send(Message::Run(Box::new(job))).is_ok()
    }

    /// Jobs waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tx.len()
    }

    /// Loop thread name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for EventLoopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoopHandle")
            .field("name", &self.name)
            .field("pending", &self.pending())
            .finish()
    }
}

/// A named thread running posted jobs in order.
pub struct EventLoop {
    handle: EventLoopHandle,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl EventLoop {
    /// Spawn the loop thread.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread could not be spawned.
    pub fn spawn(name: impl Into<String>) -> io::Result<Self> {
        let name: String = name.into();
        let (tx, rx) = unbounded::<Message>();
        let thread_name = name.clone();
        let worker = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_loop(&thread_name, &rx))?;
        Ok(Self {
            handle: EventLoopHandle {
                name: name.into(),
                tx,
            },
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Post a job. Returns `false` if the loop has exited.
    pub fn post<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.post(job)
    }

    /// A cloneable posting handle.
    #[must_use]
    pub fn handle(&self) -> EventLoopHandle {
        self.handle.clone()
    }

    /// Ask the loop to exit after the jobs already queued, then join it.
    pub fn shutdown(&self) {
        let Some(worker) = self.worker.lock().take() else {
            return;
        };
        let _ = self.handle.tx.send(Message::Stop);
        if worker.join().is_err() {
            warn!(event_loop = %self.handle.name, "event loop thread panicked");
        }
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        // Don't join here; a wedged loop would hang the dropping thread.
        let _ = self.handle.tx.send(Message::Stop);
    }
}

fn run_loop(name: &str, rx: &Receiver<Message>) {
    debug!(event_loop = %name, "event loop started");
    while let Ok(Message::Run(job)) = rx.recv() {
        job();
    }
    debug!(event_loop = %name, "event loop exiting");
}

/// Liveness checker for an [`EventLoop`].
pub struct EventLoopChecker {
    handle: EventLoopHandle,
    probe: Arc<ProbeState>,
}

impl EventLoopChecker {
    /// Bind a checker to a loop.
    #[must_use]
    pub fn new(handle: EventLoopHandle) -> Self {
        Self {
            handle,
            probe: Arc::new(ProbeState::new()),
        }
    }
}

impl LivenessChecker for EventLoopChecker {
    fn schedule_check(&self) {
        let generation = self.probe.arm();
        let probe = Arc::clone(&self.probe);
        if !self.handle.post(move || probe.complete(generation)) {
            // An exited loop is not a hung loop.
            debug!(event_loop = %self.handle.name(), "event loop closed, probe skipped");
            self.probe.complete(generation);
        }
    }

    fn check_state(&self) -> CheckState {
        self.probe.poll()
    }

    fn dump_info(&self) -> String {
        let waiting = self
            .probe
            .pending_for_ms()
            .map_or_else(|| "answered".to_string(), |ms| format!("pending for {ms}ms"));
        format!(
            "event loop `{}`: {} queued jobs, probe {waiting}",
            self.handle.name(),
            self.handle.pending()
        )
    }
}

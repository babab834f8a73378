//! Shared probe bookkeeping.
//!
//! Each dispatched probe carries a generation number. A probe only counts as
//! answered when the generation it completes is the one most recently armed,
//! so a late answer to an abandoned probe cannot hide a new stall.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::core::CheckState;
use crate::util::clock::now_ms;

/// Completion state of the most recent probe.
#[derive(Debug, Default)]
pub struct ProbeState {
    armed_gen: AtomicU64,
    completed_gen: AtomicU64,
    polls: AtomicU32,
    armed_at_ms: AtomicU64,
}

impl ProbeState {
    /// Create a state with no probe outstanding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new probe and return its generation.
    pub fn arm(&self) -> u64 {
        self.polls.store(0, Ordering::SeqCst);
        self.armed_at_ms.store(now_ms(), Ordering::SeqCst);
        self.armed_gen.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Mark probe `generation` as answered. Called from the monitored thread.
    pub fn complete(&self, generation: u64) {
        self.completed_gen.fetch_max(generation, Ordering::SeqCst);
    }

    /// Whether the most recently armed probe has been answered.
    pub fn is_completed(&self) -> bool {
        self.completed_gen.load(Ordering::SeqCst) >= self.armed_gen.load(Ordering::SeqCst)
    }

    /// Poll the current probe. The first unanswered poll reports
    /// `HalfBlocked`, every later one `Blocked`.
    pub fn poll(&self) -> CheckState {
        if self.is_completed() {
            return CheckState::Completed;
        }
        if self.polls.fetch_add(1, Ordering::SeqCst) == 0 {
            CheckState::HalfBlocked
        } else {
            CheckState::Blocked
        }
    }

    /// How long the current probe has been waiting, if it is unanswered.
    pub fn pending_for_ms(&self) -> Option<u64> {
        if self.is_completed() {
            None
        } else {
            Some(now_ms().saturating_sub(self.armed_at_ms.load(Ordering::SeqCst)))
        }
    }
}

//! Liveness checker contract.
//!
//! A checker is bound to one monitored thread. The scheduler drives it through
//! a two-phase cycle: [`LivenessChecker::schedule_check`] posts a probe into the
//! thread's own queue, and on later ticks [`LivenessChecker::check_state`]
//! reports how long that probe has been left unanswered.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of polling an outstanding probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    /// The probe ran; the thread is healthy.
    Completed,
    /// The probe is still pending after about half the tolerated window.
    HalfBlocked,
    /// The probe is still pending after the full tolerated window.
    Blocked,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::HalfBlocked => write!(f, "half_blocked"),
            Self::Blocked => write!(f, "blocked"),
        }
    }
}

/// Capability for probing one monitored thread.
///
/// Implementations must not block: every method is called on the shared
/// scheduler thread.
pub trait LivenessChecker: Send + Sync {
    /// Post a no-op probe into the target thread's queue. Fire-and-forget.
    fn schedule_check(&self);

    /// Poll the most recent probe.
    fn check_state(&self) -> CheckState;

    /// Human-readable state of the monitored thread for diagnostics.
    fn dump_info(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_state_display() {
        assert_eq!(CheckState::Completed.to_string(), "completed");
        assert_eq!(CheckState::HalfBlocked.to_string(), "half_blocked");
        assert_eq!(CheckState::Blocked.to_string(), "blocked");
    }

    #[test]
    fn test_check_state_serde() {
        let json = serde_json::to_string(&CheckState::HalfBlocked).unwrap();
        assert_eq!(json, "\"half_blocked\"");
    }
}

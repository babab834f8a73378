//! Core scheduling, task model and escalation policy.

pub mod checker;
pub mod diagnostic;
pub mod error;
pub mod escalation;
pub mod registry;
pub mod task;
pub mod watchdog;

pub use checker::{CheckState, LivenessChecker};
pub use diagnostic::{
    build_diagnostic_event, DiagnosticEvent, DiagnosticSink, EventKind, InMemoryDiagnosticSink,
    ProcessIdentity, TracingSink,
};
pub use error::{AppResult, WatchdogError};
pub use escalation::{Escalation, ProcessExit, Terminate};
pub use registry::{Lifecycle, Registry, WatchdogStats};
pub use task::{Action, RunOutcome, Task, TaskId, TaskKind, TimeoutCallback};
pub use watchdog::Watchdog;

//! Error types for watchdog operations.

use thiserror::Error;

/// Errors returned when a task cannot be admitted to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchdogError {
    /// Empty name, zero interval, or an otherwise unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A periodic task with this name is already active.
    #[error("duplicate task name: {0}")]
    DuplicateName(String),
    /// The registry already holds its maximum number of tasks.
    #[error("capacity exceeded: limit is {capacity} tasks")]
    CapacityExceeded {
        /// Configured task limit.
        capacity: usize,
    },
    /// The scheduler was shut down; it cannot be restarted.
    #[error("watchdog has been stopped")]
    Stopped,
    /// The scheduler thread could not be spawned.
    #[error("failed to spawn scheduler thread: {0}")]
    Spawn(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

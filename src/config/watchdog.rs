//! Watchdog configuration structures.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Maximum number of tasks resident in the scheduler at once.
pub const DEFAULT_CAPACITY: usize = 128;
/// Scheduler sleep when no task is queued.
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 60_000;
/// Delay between a block report and process termination.
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 3_000;
/// Monitoring interval used when a registrant does not supply one.
pub const DEFAULT_INTERVAL_MS: u64 = 3_000;

/// Scheduler and escalation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Maximum queued tasks. The task being executed is not counted.
    pub capacity: usize,
    /// Idle sleep when the queue is empty, in milliseconds.
    pub idle_timeout_ms: u64,
    /// Grace period before fail-fast termination, in milliseconds.
    pub grace_period_ms: u64,
    /// Default liveness monitoring interval, in milliseconds.
    pub default_interval_ms: u64,
    /// Name given to the scheduler thread.
    pub thread_name: String,
    /// Exit status used when terminating a hung process.
    pub exit_code: i32,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            grace_period_ms: DEFAULT_GRACE_PERIOD_MS,
            default_interval_ms: DEFAULT_INTERVAL_MS,
            thread_name: "watchdog".to_string(),
            exit_code: 1,
        }
    }
}

impl WatchdogConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the task capacity.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the idle timeout.
    #[must_use]
    pub const fn with_idle_timeout_ms(mut self, ms: u64) -> Self {
        self.idle_timeout_ms = ms;
        self
    }

    /// Set the grace period before termination.
    #[must_use]
    pub const fn with_grace_period_ms(mut self, ms: u64) -> Self {
        self.grace_period_ms = ms;
        self
    }

    /// Set the default liveness interval.
    #[must_use]
    pub const fn with_default_interval_ms(mut self, ms: u64) -> Self {
        self.default_interval_ms = ms;
        self
    }

    /// Set the scheduler thread name.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Idle timeout as a `Duration`.
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Grace period as a `Duration`.
    #[must_use]
    pub const fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be greater than 0".into());
        }
        if self.idle_timeout_ms == 0 {
            return Err("idle_timeout_ms must be greater than 0".into());
        }
        if self.default_interval_ms == 0 {
            return Err("default_interval_ms must be greater than 0".into());
        }
        if self.thread_name.trim().is_empty() {
            return Err("thread_name must not be empty".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from `WATCHDOG_*` environment variables, reading a
    /// `.env` file first if one is present.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from defaults overridden by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup("WATCHDOG_CAPACITY") {
            cfg.capacity = parse_var("WATCHDOG_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("WATCHDOG_IDLE_TIMEOUT_MS") {
            cfg.idle_timeout_ms = parse_var("WATCHDOG_IDLE_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("WATCHDOG_GRACE_PERIOD_MS") {
            cfg.grace_period_ms = parse_var("WATCHDOG_GRACE_PERIOD_MS", &v)?;
        }
        if let Some(v) = lookup("WATCHDOG_DEFAULT_INTERVAL_MS") {
            cfg.default_interval_ms = parse_var("WATCHDOG_DEFAULT_INTERVAL_MS", &v)?;
        }
        if let Some(v) = lookup("WATCHDOG_THREAD_NAME") {
            cfg.thread_name = v;
        }
        if let Some(v) = lookup("WATCHDOG_EXIT_CODE") {
            cfg.exit_code = parse_var("WATCHDOG_EXIT_CODE", &v)?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| format!("`{key}` invalid: {e}"))
}

//! # Prometheus Watchdog
//!
//! In-process hang detection and a shared deadline scheduler.
//!
//! One background thread owns a deadline-ordered queue of tasks. Some tasks
//! probe worker threads to confirm they are still draining their event
//! queues; others are plain periodic or one-shot maintenance callbacks that
//! share the same timer thread.
//!
//! ## Escalation
//!
//! A liveness task dispatches a probe into its monitored thread and checks it
//! on the following ticks:
//!
//! - **Completed**: healthy, the next probe goes out.
//! - **Half blocked**: a `ServiceWarning` is reported.
//! - **Blocked**: a `ServiceBlock` is reported, the grace period elapses, and
//!   the process is terminated. A registrant can supply a timeout callback to
//!   take over both stages instead.
//!
//! If the scheduler itself was paused for more than two intervals (for example
//! a suspended process), the tick is skipped rather than reported as a hang.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use prometheus_watchdog::builders::WatchdogBuilder;
//! use prometheus_watchdog::config::WatchdogConfig;
//! use prometheus_watchdog::infra::{EventLoop, EventLoopChecker};
//!
//! let main_loop = EventLoop::spawn("main-loop")?;
//! let watchdog = WatchdogBuilder::new()
//!     .config(WatchdogConfig::new().with_default_interval_ms(3_000))
//!     .build()?;
//!
//! watchdog.register_liveness_task_default(
//!     "main-loop",
//!     Arc::new(EventLoopChecker::new(main_loop.handle())),
//! )?;
//! watchdog.run_periodic("rotate-logs", || { /* ... */ }, 60_000, 60_000);
//!
//! // ... on exit
//! watchdog.shutdown();
//! main_loop.shutdown();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling, task model and escalation policy.
pub mod core;
/// Configuration models for the scheduler and escalation policy.
pub mod config;
/// Builders to construct watchdogs from configuration.
pub mod builders;
/// Infrastructure adapters: deadline queue and liveness checkers.
pub mod infra;
/// Shared utilities.
pub mod util;

pub use crate::core::{Watchdog, WatchdogError};

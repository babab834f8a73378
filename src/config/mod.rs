//! Configuration models for the scheduler and escalation policy.

pub mod watchdog;

pub use watchdog::WatchdogConfig;

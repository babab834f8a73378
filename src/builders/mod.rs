//! Builders to construct watchdogs from configuration.

pub mod watchdog_builder;

pub use watchdog_builder::WatchdogBuilder;

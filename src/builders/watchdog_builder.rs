//! Builder for [`Watchdog`] instances.

use std::sync::Arc;

use crate::config::WatchdogConfig;
use crate::core::{DiagnosticSink, ProcessExit, Terminate, TracingSink, Watchdog, WatchdogError};

/// Fluent construction of a [`Watchdog`].
///
/// Unset collaborators fall back to [`TracingSink`] and a [`ProcessExit`]
/// using the configured exit code.
#[derive(Default)]
pub struct WatchdogBuilder {
    config: WatchdogConfig,
    sink: Option<Arc<dyn DiagnosticSink>>,
    terminator: Option<Arc<dyn Terminate>>,
}

impl WatchdogBuilder {
    /// Start from the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the configuration.
    #[must_use]
    pub fn config(mut self, config: WatchdogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the diagnostic sink.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set the fail-fast terminator.
    #[must_use]
    pub fn terminator(mut self, terminator: Arc<dyn Terminate>) -> Self {
        self.terminator = Some(terminator);
        self
    }

    /// Build the watchdog. The scheduler thread starts on first use.
    ///
    /// # Errors
    ///
    /// Returns `WatchdogError::InvalidArgument` if the configuration is invalid.
    pub fn build(self) -> Result<Watchdog, WatchdogError> {
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(TracingSink) as Arc<dyn DiagnosticSink>);
        let terminator = self
            .terminator
            .unwrap_or_else(|| Arc::new(ProcessExit::new(self.config.exit_code)) as Arc<dyn Terminate>);
        Watchdog::new(self.config, sink, terminator)
    }
}

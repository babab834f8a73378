//! Liveness checkers for common kinds of monitored threads.

pub mod probe;
#[cfg(not(target_arch = "wasm32"))]
pub mod event_loop;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_runtime;

pub use probe::ProbeState;
#[cfg(not(target_arch = "wasm32"))]
pub use event_loop::{EventLoop, EventLoopChecker, EventLoopHandle};
#[cfg(feature = "tokio-runtime")]
pub use tokio_runtime::TokioRuntimeChecker;

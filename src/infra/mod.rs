//! Infrastructure adapters: the deadline queue and reference liveness checkers.

pub mod checker;
pub mod queue;

#[cfg(not(target_arch = "wasm32"))]
pub use checker::{EventLoop, EventLoopChecker, EventLoopHandle};
#[cfg(feature = "tokio-runtime")]
pub use checker::TokioRuntimeChecker;
pub use checker::ProbeState;
pub use queue::DeadlineQueue;

//! Task runners (native threads, tokio, in-memory) and the status API.

pub mod api;
pub mod simulated;
pub mod thread_runner;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_runner;

pub use api::{health, session_status, Health, SessionStatus};
pub use simulated::SimulatedRunner;
pub use thread_runner::{ForegroundRoutine, ThreadRunner};
#[cfg(feature = "tokio-runtime")]
pub use tokio_runner::TokioRunner;

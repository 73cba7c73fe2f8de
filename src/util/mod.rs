//! Shared utilities: clock, serializable ids and quotes, telemetry.

pub mod clock;
pub mod serde;
pub mod telemetry;

pub use self::clock::now_ms;
pub use self::serde::{ResourceKind, ResourceQuote, TaskHandle, TaskId};
pub use self::telemetry::{init_tracing, LOG_ENV};

//! Error types for simulator operations.

use thiserror::Error;

use crate::util::serde::{ResourceKind, ResourceQuote};

/// Errors produced by the simulator core and task runners.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// The ledger cannot satisfy the requested quote.
    #[error("not enough {short}: requested {requested}, available {available}")]
    ResourceExhausted {
        /// First dimension found short.
        short: ResourceKind,
        /// Quote that was requested.
        requested: ResourceQuote,
        /// Ledger availability at the time of the request.
        available: ResourceQuote,
    },
    /// The task registry already holds its maximum number of tasks.
    #[error("maximum number of tasks reached ({max})")]
    CapacityExceeded {
        /// Registry capacity.
        max: usize,
    },
    /// Index out of range, or the slot is not running.
    #[error("invalid task index: {0}")]
    InvalidIndex(usize),
    /// The runner could not start a background worker.
    #[error("spawn failed: {0}")]
    Spawn(String),
    /// The runner failed to stop a worker.
    #[error("terminate failed: {0}")]
    Terminate(String),
    /// The session has been shut down.
    #[error("session is shut down")]
    SessionClosed,
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SimError {
    /// True for errors the operator can recover from by retrying or choosing differently.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ResourceExhausted { .. } | Self::CapacityExceeded { .. } | Self::InvalidIndex(_)
        )
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

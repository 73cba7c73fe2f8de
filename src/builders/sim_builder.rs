//! Builders to construct a simulator session from configuration.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::config::{RunnerConfig, SimConfig};
use crate::core::{BoxedRunner, InMemoryAuditSink, SimError, Simulator, TracingAuditSink};
use crate::runtime::{SimulatedRunner, ThreadRunner};

/// Audit journal shared between the session and its observers.
pub type SharedJournal = Arc<Mutex<InMemoryAuditSink>>;

/// A built session plus the handle on its audit journal.
pub struct Session {
    /// The simulator.
    pub simulator: Simulator<BoxedRunner>,
    /// In-memory journal; `None` when `audit_capacity` is `0`.
    pub journal: Option<SharedJournal>,
}

/// Build the runner selected by `runner`.
///
/// The tokio runner reuses the ambient runtime when called from inside one
/// and otherwise owns a small multi-threaded runtime.
///
/// # Errors
///
/// [`SimError::Spawn`] when a tokio runtime cannot be built, or
/// [`SimError::InvalidConfig`] when tokio support is compiled out.
pub fn build_runner(runner: RunnerConfig) -> Result<BoxedRunner, SimError> {
    match runner {
        RunnerConfig::Threads => Ok(Box::new(ThreadRunner::new())),
        RunnerConfig::Simulated => Ok(Box::new(SimulatedRunner::new())),
        #[cfg(feature = "tokio-runtime")]
        RunnerConfig::Tokio => {
            use crate::runtime::TokioRunner;
            let runner = match TokioRunner::from_current() {
                Ok(runner) => runner,
                Err(_) => TokioRunner::with_worker_threads(num_cpus::get().min(4))?,
            };
            Ok(Box::new(runner))
        }
        #[cfg(not(feature = "tokio-runtime"))]
        RunnerConfig::Tokio => Err(SimError::InvalidConfig(
            "runner `tokio` requires the tokio-runtime feature".into(),
        )),
    }
}

/// Build a simulator that reports audit events through `tracing`.
///
/// # Errors
///
/// [`SimError::InvalidConfig`] when `cfg` fails validation, or the runner
/// construction error.
pub fn build_simulator(cfg: &SimConfig) -> Result<Simulator<BoxedRunner>, SimError> {
    cfg.validate()?;
    let runner = build_runner(cfg.runner)?;
    let simulator = Simulator::new(cfg.to_limits(), cfg.to_scheduler(), runner)?
        .with_audit(Box::new(TracingAuditSink));
    info!(runner = ?cfg.runner, "simulator built");
    Ok(simulator)
}

/// Build a simulator with an in-memory journal of `audit_capacity` events.
///
/// # Errors
///
/// Same as [`build_simulator`].
pub fn build_session(cfg: &SimConfig) -> Result<Session, SimError> {
    cfg.validate()?;
    let runner = build_runner(cfg.runner)?;
    let simulator = Simulator::new(cfg.to_limits(), cfg.to_scheduler(), runner)?;
    if cfg.audit_capacity == 0 {
        return Ok(Session {
            simulator: simulator.with_audit(Box::new(TracingAuditSink)),
            journal: None,
        });
    }
    let journal: SharedJournal = Arc::new(Mutex::new(InMemoryAuditSink::new(cfg.audit_capacity)));
    info!(runner = ?cfg.runner, audit_capacity = cfg.audit_capacity, "session built");
    Ok(Session {
        simulator: simulator.with_audit(Box::new(Arc::clone(&journal))),
        journal: Some(journal),
    })
}

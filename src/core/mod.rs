//! Task lifecycle and scheduling core.

pub mod audit;
pub mod error;
pub mod kind;
pub mod ledger;
pub mod registry;
pub mod runner;
pub mod scheduler;
pub mod simulator;
pub mod task;

pub use audit::{
    build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink,
};
pub use error::{AppResult, SimError};
pub use kind::{ExecMode, TaskKind};
pub use ledger::{LedgerSnapshot, ResourceLedger};
pub use registry::TaskRegistry;
pub use runner::{BoxedRunner, TaskRunner};
pub use scheduler::{
    QuantumCharge, Scheduler, SchedulingInfo, SchedulingPolicy, TickReport, DEFAULT_QUANTUM,
};
pub use simulator::{LaunchOutcome, SessionLimits, Simulator, DEFAULT_MAX_TASKS};
pub use task::{Task, TaskSpec, TaskView, MAX_NAME_LEN};

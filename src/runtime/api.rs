//! Serializable views of a session for status dumps and front-ends.

use serde::{Deserialize, Serialize};

use crate::core::{QuantumCharge, SchedulingPolicy, Simulator, TaskRunner};

pub use crate::core::{LedgerSnapshot, SchedulingInfo, TaskView};

/// Everything an observer needs to render a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Active scheduling policy.
    pub policy: SchedulingPolicy,
    /// Round Robin quantum.
    pub quantum: i32,
    /// Round Robin charge point.
    pub charge: QuantumCharge,
    /// Ledger totals and availability.
    pub ledger: LedgerSnapshot,
    /// Registered tasks in scheduling order.
    pub tasks: Vec<TaskView>,
    /// Workers the runner still tracks.
    pub live_workers: usize,
    /// Whether the session has been shut down.
    pub closed: bool,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
    /// Registered task count.
    pub tasks: usize,
}

/// Capture a [`SessionStatus`].
pub fn session_status<R: TaskRunner>(sim: &Simulator<R>) -> SessionStatus {
    let info = sim.scheduling_info();
    SessionStatus {
        policy: info.policy,
        quantum: info.quantum,
        charge: info.charge,
        ledger: sim.snapshot(),
        tasks: info.queue,
        live_workers: sim.runner().live_workers(),
        closed: sim.is_closed(),
    }
}

/// Healthy while the session is open.
pub fn health<R: TaskRunner>(sim: &Simulator<R>) -> Health {
    Health {
        ok: !sim.is_closed(),
        tasks: sim.len(),
    }
}

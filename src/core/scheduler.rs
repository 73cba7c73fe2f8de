//! CPU scheduling policies applied to the task registry on every tick.
//!
//! | Policy      | Reorders                | Evicts                          |
//! |-------------|-------------------------|---------------------------------|
//! | FCFS        | never                   | never                           |
//! | Round Robin | head moves to tail      | charged task at `remaining <= 0` |
//! | Priority    | stable sort, high first | never                           |
//!
//! Switching policy only records the choice; the registry is reordered by the
//! next tick.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::{ResourceLedger, SimError, Task, TaskRegistry, TaskRunner, TaskView};
use crate::util::serde::TaskId;

/// Default Round Robin quantum, in ticks of work.
pub const DEFAULT_QUANTUM: i32 = 2;

/// Active scheduling policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingPolicy {
    /// First-come-first-serve: arrival order, no eviction.
    #[default]
    Fcfs,
    /// Rotate the head to the tail and charge a quantum.
    RoundRobin,
    /// Highest priority first.
    Priority,
}

impl SchedulingPolicy {
    /// Every policy, in menu order.
    pub const ALL: [Self; 3] = [Self::Fcfs, Self::RoundRobin, Self::Priority];

    /// Short label for headers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fcfs => "FCFS",
            Self::RoundRobin => "Round Robin",
            Self::Priority => "Priority",
        }
    }

    /// Long description for the scheduling screen.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Fcfs => "First-Come-First-Serve",
            Self::RoundRobin => "Round Robin",
            Self::Priority => "Priority",
        }
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SchedulingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "fcfs" | "fifo" | "first_come_first_serve" => Ok(Self::Fcfs),
            "rr" | "round_robin" => Ok(Self::RoundRobin),
            "priority" | "prio" => Ok(Self::Priority),
            other => Err(format!("unknown scheduling policy `{other}`")),
        }
    }
}

/// Which task a Round Robin tick charges the quantum to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantumCharge {
    /// The task that becomes head after rotation, i.e. the one dispatched next.
    #[default]
    Incoming,
    /// The task just rotated from head to tail.
    Outgoing,
}

/// Scheduling screen contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingInfo {
    /// Active policy.
    pub policy: SchedulingPolicy,
    /// Round Robin quantum.
    pub quantum: i32,
    /// Round Robin charge point.
    pub charge: QuantumCharge,
    /// Registry in scheduling order.
    pub queue: Vec<TaskView>,
}

/// What a tick did.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Policy applied; `None` when the registry was empty.
    pub policy: Option<SchedulingPolicy>,
    /// Whether the registry was rotated.
    pub rotated: bool,
    /// Task charged a quantum and its remaining time afterwards.
    pub charged: Option<(TaskId, i32)>,
    /// Task removed because its remaining time ran out.
    pub evicted: Option<Task>,
    /// Termination failure tolerated while evicting.
    pub terminate_error: Option<SimError>,
}

/// Policy state plus the Round Robin parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheduler {
    policy: SchedulingPolicy,
    quantum: i32,
    charge: QuantumCharge,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulingPolicy::default(), DEFAULT_QUANTUM, QuantumCharge::default())
    }
}

impl Scheduler {
    /// Create a scheduler.
    #[must_use]
    pub const fn new(policy: SchedulingPolicy, quantum: i32, charge: QuantumCharge) -> Self {
        Self {
            policy,
            quantum,
            charge,
        }
    }

    /// Active policy.
    #[must_use]
    pub const fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    /// Round Robin quantum.
    #[must_use]
    pub const fn quantum(&self) -> i32 {
        self.quantum
    }

    /// Round Robin charge point.
    #[must_use]
    pub const fn charge(&self) -> QuantumCharge {
        self.charge
    }

    /// Switch policy; takes effect on the next tick.
    pub fn set_policy(&mut self, policy: SchedulingPolicy) {
        if policy != self.policy {
            info!(from = %self.policy, to = %policy, "scheduling policy changed");
        }
        self.policy = policy;
    }

    /// Apply the active policy once.
    ///
    /// Never fails: a worker that cannot be terminated is logged and reported
    /// in [`TickReport::terminate_error`], and the evicted task's quote is
    /// released regardless.
    pub fn tick<R>(
        &self,
        registry: &mut TaskRegistry,
        ledger: &ResourceLedger,
        runner: &R,
    ) -> TickReport
    where
        R: TaskRunner + ?Sized,
    {
        if registry.is_empty() {
            return TickReport::default();
        }

        let mut report = TickReport {
            policy: Some(self.policy),
            ..TickReport::default()
        };

        match self.policy {
            SchedulingPolicy::Fcfs => {}
            SchedulingPolicy::RoundRobin => self.round_robin(registry, ledger, runner, &mut report),
            SchedulingPolicy::Priority => {
                registry.sort_by_priority();
                debug!(len = registry.len(), "registry sorted by priority");
            }
        }
        report
    }

    fn round_robin<R>(
        &self,
        registry: &mut TaskRegistry,
        ledger: &ResourceLedger,
        runner: &R,
        report: &mut TickReport,
    ) where
        R: TaskRunner + ?Sized,
    {
        registry.rotate_left();
        report.rotated = true;

        let index = match self.charge {
            QuantumCharge::Incoming => 0,
            QuantumCharge::Outgoing => registry.len() - 1,
        };
        let Ok(task) = registry.get_mut(index) else {
            return;
        };
        task.remaining = task.remaining.saturating_sub(self.quantum);
        report.charged = Some((task.id(), task.remaining));
        debug!(task_id = task.id(), remaining = task.remaining, "quantum charged");

        if task.remaining > 0 {
            return;
        }

        let Ok(task) = registry.remove(index) else {
            return;
        };
        ledger.release(&task.quote());
        if let Err(e) = runner.terminate(task.handle()) {
            warn!(task_id = task.id(), error = %e, "failed to terminate exhausted task");
            report.terminate_error = Some(e);
        }
        info!(task_id = task.id(), name = task.name(), "task finished its burst and was evicted");
        report.evicted = Some(task);
    }
}

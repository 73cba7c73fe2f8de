//! Task records held by the registry.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core::TaskKind;
use crate::util::clock::now_ms;
use crate::util::serde::{ResourceQuote, TaskHandle, TaskId};

/// Longest display name a task keeps, in characters.
pub const MAX_NAME_LEN: usize = 49;

/// Parameters for registering a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Display name; truncated to [`MAX_NAME_LEN`] characters.
    pub name: String,
    /// Application kind backing the task.
    pub kind: TaskKind,
    /// Resources reserved for the task's lifetime.
    pub quote: ResourceQuote,
    /// Scheduling priority, higher is more urgent.
    pub priority: i32,
    /// Ticks of work left.
    pub remaining: i32,
    /// Runner token for the backing worker.
    pub handle: TaskHandle,
}

impl TaskSpec {
    /// Parameters for `kind` using its static quote and name.
    #[must_use]
    pub fn for_kind(kind: TaskKind, priority: i32, remaining: i32, handle: TaskHandle) -> Self {
        Self {
            name: kind.name().to_string(),
            kind,
            quote: kind.quote(),
            priority,
            remaining,
            handle,
        }
    }
}

/// One live unit of simulated work.
#[derive(Debug, Clone)]
pub struct Task {
    id: TaskId,
    handle: TaskHandle,
    name: String,
    kind: TaskKind,
    quote: ResourceQuote,
    /// Always `true` while the task is registered.
    pub running: bool,
    /// Hidden from the foreground.
    pub minimized: bool,
    /// Scheduling priority, higher is more urgent.
    pub priority: i32,
    /// Ticks of work left; Round Robin evicts at zero or below.
    pub remaining: i32,
    started: Instant,
    started_at_ms: u128,
}

impl Task {
    /// Build a running, non-minimized task stamped with the current time.
    #[must_use]
    pub fn new(id: TaskId, spec: TaskSpec) -> Self {
        Self {
            id,
            handle: spec.handle,
            name: truncate_name(&spec.name),
            kind: spec.kind,
            quote: spec.quote,
            running: true,
            minimized: false,
            priority: spec.priority,
            remaining: spec.remaining,
            started: Instant::now(),
            started_at_ms: now_ms(),
        }
    }

    /// Session-unique identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Runner token for the backing worker.
    #[must_use]
    pub const fn handle(&self) -> TaskHandle {
        self.handle
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Application kind.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Resources held; fixed for the task's lifetime.
    #[must_use]
    pub const fn quote(&self) -> ResourceQuote {
        self.quote
    }

    /// Creation time in milliseconds since the epoch.
    #[must_use]
    pub const fn started_at_ms(&self) -> u128 {
        self.started_at_ms
    }

    /// Time since creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Read-only snapshot of a task for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskView {
    /// Position in the registry at snapshot time.
    pub index: usize,
    /// Task identifier.
    pub id: TaskId,
    /// Runner token.
    pub handle: TaskHandle,
    /// Display name.
    pub name: String,
    /// Application kind.
    pub kind: TaskKind,
    /// Resources held.
    pub quote: ResourceQuote,
    /// Scheduling priority.
    pub priority: i32,
    /// Ticks of work left.
    pub remaining: i32,
    /// Running flag.
    pub running: bool,
    /// Minimized flag.
    pub minimized: bool,
    /// Whole seconds since creation.
    pub elapsed_secs: u64,
    /// Creation time in milliseconds since the epoch.
    pub started_at_ms: u128,
}

impl TaskView {
    /// Snapshot `task` at registry position `index`.
    #[must_use]
    pub fn new(index: usize, task: &Task) -> Self {
        Self {
            index,
            id: task.id,
            handle: task.handle,
            name: task.name.clone(),
            kind: task.kind,
            quote: task.quote,
            priority: task.priority,
            remaining: task.remaining,
            running: task.running,
            minimized: task.minimized,
            elapsed_secs: task.elapsed().as_secs(),
            started_at_ms: task.started_at_ms,
        }
    }

    /// "Minimized" or "Running".
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        if self.minimized {
            "Minimized"
        } else {
            "Running"
        }
    }
}

fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_NAME_LEN).collect()
}

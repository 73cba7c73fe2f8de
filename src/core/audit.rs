//! Audit sink implementations.
//!
//! Every task lifecycle change in a session is recorded as an [`AuditEvent`]:
//! creations, rejections, closes, evictions, flag toggles, policy switches and
//! shutdown. Tolerated failures (a worker that would not terminate) land here
//! too, in the event's `detail`.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::clock::now_ms;
use crate::util::serde::TaskId;

/// Lifecycle action recorded by the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Task registered.
    Create,
    /// Creation refused (resources, capacity, spawn failure).
    Reject,
    /// Task closed by the operator.
    Close,
    /// Task removed by Round Robin exhaustion.
    Evict,
    /// Task minimized.
    Minimize,
    /// Task restored.
    Restore,
    /// Scheduling policy switched.
    Policy,
    /// Session shut down.
    Shutdown,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Create => "create",
            Self::Reject => "reject",
            Self::Close => "close",
            Self::Evict => "evict",
            Self::Minimize => "minimize",
            Self::Restore => "restore",
            Self::Policy => "policy",
            Self::Shutdown => "shutdown",
        };
        f.write_str(label)
    }
}

/// Audit event structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Related task, if any.
    pub task_id: Option<TaskId>,
    /// Related task name, if any.
    pub task_name: Option<String>,
    /// Action taken.
    pub action: AuditAction,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context.
    pub detail: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// Shared sinks let the caller keep a handle for inspection.
impl<S: AuditSink> AuditSink for Arc<Mutex<S>> {
    fn record(&mut self, event: AuditEvent) {
        self.lock().record(event);
    }
}

/// Sink that forwards events to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&mut self, event: AuditEvent) {
        tracing::debug!(
            action = %event.action,
            task_id = ?event.task_id,
            detail = ?event.detail,
            "audit"
        );
    }
}

/// In-memory audit sink with a bounded buffer.
#[derive(Debug)]
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink keeping at most `max_events`.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events.min(1024)),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }

    /// Actions of stored events, oldest first.
    #[must_use]
    pub fn actions(&self) -> Vec<AuditAction> {
        self.events.iter().map(|e| e.action).collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Helper to build an audit event from context.
pub fn build_audit_event(
    action: AuditAction,
    task_id: Option<TaskId>,
    task_name: Option<&str>,
    detail: Option<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: Uuid::new_v4().to_string(),
        task_id,
        task_name: task_name.map(str::to_string),
        action,
        created_at_ms: now_ms(),
        detail,
    }
}

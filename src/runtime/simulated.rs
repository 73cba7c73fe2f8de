//! In-memory runner with no real workers.
//!
//! Handles are tracked in a set; nothing executes. Useful for dry runs and
//! deterministic tests. An optional spawn limit models a host that refuses to
//! start more workers.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::core::{SimError, TaskKind, TaskRunner};
use crate::util::serde::TaskHandle;

/// Runner that only books handles.
#[derive(Debug, Default)]
pub struct SimulatedRunner {
    live: Mutex<HashSet<TaskHandle>>,
    next_handle: AtomicU64,
    spawn_limit: Option<usize>,
    terminate_calls: AtomicU64,
    foreground: Mutex<Vec<TaskKind>>,
}

impl SimulatedRunner {
    /// Runner without a spawn limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to spawn once `limit` workers are live.
    #[must_use]
    pub fn with_spawn_limit(mut self, limit: usize) -> Self {
        self.spawn_limit = Some(limit);
        self
    }

    /// Whether `handle` was spawned and not yet terminated.
    #[must_use]
    pub fn is_live(&self, handle: TaskHandle) -> bool {
        self.live.lock().contains(&handle)
    }

    /// Number of `terminate` calls, including repeated ones.
    #[must_use]
    pub fn terminate_calls(&self) -> u64 {
        self.terminate_calls.load(Ordering::Relaxed)
    }

    /// Kinds run in the foreground, in order.
    #[must_use]
    pub fn foreground_runs(&self) -> Vec<TaskKind> {
        self.foreground.lock().clone()
    }
}

impl TaskRunner for SimulatedRunner {
    fn spawn(&self, kind: TaskKind) -> Result<TaskHandle, SimError> {
        let mut live = self.live.lock();
        if let Some(limit) = self.spawn_limit {
            if live.len() >= limit {
                return Err(SimError::Spawn(format!(
                    "{kind}: worker limit of {limit} reached"
                )));
            }
        }
        let handle = TaskHandle(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        live.insert(handle);
        tracing::trace!(%handle, kind = %kind, "simulated worker spawned");
        Ok(handle)
    }

    fn terminate(&self, handle: TaskHandle) -> Result<(), SimError> {
        self.terminate_calls.fetch_add(1, Ordering::Relaxed);
        if !self.live.lock().remove(&handle) {
            tracing::trace!(%handle, "simulated worker already gone");
        }
        Ok(())
    }

    fn run_foreground(&self, kind: TaskKind) -> Result<(), SimError> {
        self.foreground.lock().push(kind);
        Ok(())
    }

    fn live_workers(&self) -> usize {
        self.live.lock().len()
    }
}

//! Tokio runner: background tasks become tokio tasks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::core::{SimError, TaskKind, TaskRunner};
use crate::util::serde::TaskHandle;

/// Runner that executes workers on a tokio runtime.
pub struct TokioRunner {
    handle: Handle,
    // Kept alive when the runner built its own runtime.
    runtime: Option<Runtime>,
    workers: Mutex<HashMap<TaskHandle, (TaskKind, JoinHandle<()>)>>,
    next_handle: AtomicU64,
}

impl TokioRunner {
    /// Runner on an existing runtime.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            runtime: None,
            workers: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(0),
        }
    }

    /// Runner on the runtime the caller is executing in.
    ///
    /// # Errors
    ///
    /// [`SimError::Spawn`] when called outside a tokio runtime.
    pub fn from_current() -> Result<Self, SimError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| SimError::Spawn(e.to_string()))
    }

    /// Runner that owns a new multi-threaded runtime.
    ///
    /// # Errors
    ///
    /// [`SimError::Spawn`] when the runtime cannot be built.
    pub fn with_worker_threads(worker_threads: usize) -> Result<Self, SimError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .thread_name("sim-tokio")
            .enable_all()
            .build()
            .map_err(|e| SimError::Spawn(format!("tokio runtime: {e}")))?;
        let mut runner = Self::new(runtime.handle().clone());
        runner.runtime = Some(runtime);
        Ok(runner)
    }

    /// Whether the worker behind `handle` is registered and still running.
    #[must_use]
    pub fn is_running(&self, handle: TaskHandle) -> bool {
        self.workers
            .lock()
            .get(&handle)
            .is_some_and(|(_, join)| !join.is_finished())
    }
}

impl TaskRunner for TokioRunner {
    fn spawn(&self, kind: TaskKind) -> Result<TaskHandle, SimError> {
        let handle = TaskHandle(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        let join = self.handle.spawn(async move {
            let Some(interval) = kind.idle_interval() else {
                return;
            };
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                trace!(%handle, kind = %kind, "worker tick");
            }
        });
        self.workers.lock().insert(handle, (kind, join));
        debug!(%handle, kind = %kind, "tokio worker spawned");
        Ok(handle)
    }

    fn terminate(&self, handle: TaskHandle) -> Result<(), SimError> {
        if let Some((kind, join)) = self.workers.lock().remove(&handle) {
            join.abort();
            debug!(%handle, kind = %kind, "tokio worker aborted");
        }
        Ok(())
    }

    fn run_foreground(&self, kind: TaskKind) -> Result<(), SimError> {
        info!(kind = %kind, "ran in foreground");
        Ok(())
    }

    fn live_workers(&self) -> usize {
        self.workers.lock().len()
    }
}

impl Drop for TokioRunner {
    fn drop(&mut self) {
        for (_, (_, join)) in self.workers.lock().drain() {
            join.abort();
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

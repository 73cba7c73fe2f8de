//! Native runner: one dedicated OS thread per background task.
//!
//! Each worker blocks on a stop channel. Kinds with an idle loop (clock,
//! calendar) wake on their interval and go back to waiting; every other kind
//! has nothing to do and its thread exits straight away, so terminating it
//! later only reaps an already-finished thread.
//!
//! # Design Principles
//!
//! - **No polling**: workers block in `recv_timeout` on the stop channel
//! - **Clean termination**: dropping the sender unblocks the worker at once
//! - **Bounded joins**: a worker that does not exit in time is detached

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::core::{SimError, TaskKind, TaskRunner};
use crate::util::serde::TaskHandle;

/// Default worker stack size.
pub const DEFAULT_STACK_SIZE: usize = 256 * 1024;

/// How long `terminate` waits for a worker to exit.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Routine run synchronously for foreground launches.
pub type ForegroundRoutine = Arc<dyn Fn(TaskKind) -> Result<(), SimError> + Send + Sync>;

struct Worker {
    kind: TaskKind,
    stop_tx: Sender<()>,
    join: JoinHandle<()>,
}

/// Runner backed by OS threads.
pub struct ThreadRunner {
    workers: Mutex<HashMap<TaskHandle, Worker>>,
    next_handle: AtomicU64,
    stack_size: usize,
    join_timeout: Duration,
    foreground: Option<ForegroundRoutine>,
}

impl Default for ThreadRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadRunner {
    /// Runner with default stack size and join timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            workers: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(0),
            stack_size: DEFAULT_STACK_SIZE,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
            foreground: None,
        }
    }

    /// Set the worker thread stack size.
    #[must_use]
    pub const fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    /// Set how long `terminate` waits before detaching a worker.
    #[must_use]
    pub const fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Install the routine used for foreground launches.
    #[must_use]
    pub fn with_foreground(mut self, routine: ForegroundRoutine) -> Self {
        self.foreground = Some(routine);
        self
    }

    /// Whether the worker behind `handle` has not been terminated and its
    /// thread is still running.
    #[must_use]
    pub fn is_running(&self, handle: TaskHandle) -> bool {
        self.workers
            .lock()
            .get(&handle)
            .is_some_and(|w| !w.join.is_finished())
    }

    fn join_with_timeout(&self, handle: TaskHandle, worker: Worker) -> Result<(), SimError> {
        let Worker { kind, stop_tx, join } = worker;
        // Disconnecting the channel is the stop signal.
        drop(stop_tx);

        if join.is_finished() {
            return join
                .join()
                .map_err(|_| SimError::Terminate(format!("{kind} worker {handle} panicked")));
        }

        let (done_tx, done_rx) = bounded(1);
        let joiner = thread::spawn(move || {
            let _ = done_tx.send(join.join().is_ok());
        });
        match done_rx.recv_timeout(self.join_timeout) {
            Ok(true) => {
                let _ = joiner.join();
                debug!(%handle, kind = %kind, "worker joined");
                Ok(())
            }
            Ok(false) => {
                let _ = joiner.join();
                Err(SimError::Terminate(format!("{kind} worker {handle} panicked")))
            }
            Err(_) => {
                warn!(%handle, kind = %kind, "worker did not exit within timeout - detaching");
                Err(SimError::Terminate(format!(
                    "{kind} worker {handle} did not exit within {:?}",
                    self.join_timeout
                )))
            }
        }
    }
}

impl TaskRunner for ThreadRunner {
    fn spawn(&self, kind: TaskKind) -> Result<TaskHandle, SimError> {
        let handle = TaskHandle(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let join = thread::Builder::new()
            .name(format!("sim-{}-{handle}", kind.slug()))
            .stack_size(self.stack_size)
            .spawn(move || worker_loop(handle, kind, &stop_rx))
            .map_err(|e| SimError::Spawn(format!("{kind}: {e}")))?;

        self.workers.lock().insert(
            handle,
            Worker {
                kind,
                stop_tx,
                join,
            },
        );
        debug!(%handle, kind = %kind, "worker thread spawned");
        Ok(handle)
    }

    fn terminate(&self, handle: TaskHandle) -> Result<(), SimError> {
        let worker = self.workers.lock().remove(&handle);
        match worker {
            Some(worker) => self.join_with_timeout(handle, worker),
            None => {
                trace!(%handle, "worker already terminated");
                Ok(())
            }
        }
    }

    fn run_foreground(&self, kind: TaskKind) -> Result<(), SimError> {
        match &self.foreground {
            Some(routine) => routine(kind),
            None => {
                info!(kind = %kind, "ran in foreground");
                Ok(())
            }
        }
    }

    fn live_workers(&self) -> usize {
        self.workers.lock().len()
    }
}

impl Drop for ThreadRunner {
    fn drop(&mut self) {
        let workers: Vec<_> = self.workers.lock().drain().collect();
        if workers.is_empty() {
            return;
        }
        debug!(count = workers.len(), "stopping leftover workers");
        for (handle, worker) in workers {
            if let Err(e) = self.join_with_timeout(handle, worker) {
                warn!(%handle, error = %e, "leftover worker did not stop cleanly");
            }
        }
    }
}

fn worker_loop(handle: TaskHandle, kind: TaskKind, stop_rx: &Receiver<()>) {
    let Some(interval) = kind.idle_interval() else {
        trace!(%handle, kind = %kind, "worker has no idle loop, exiting");
        return;
    };
    loop {
        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => trace!(%handle, kind = %kind, "worker tick"),
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    trace!(%handle, kind = %kind, "worker stopped");
}

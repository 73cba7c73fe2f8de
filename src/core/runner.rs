//! Task runner abstraction: the units of work backing registered tasks.
//!
//! The core never looks inside a worker. It asks the runner to start one,
//! keeps the returned [`TaskHandle`], and asks the runner to stop it when the
//! task is closed, evicted, or force-closed at shutdown.

use crate::core::{SimError, TaskKind};
use crate::util::serde::TaskHandle;

/// Starts and stops the work backing each task.
///
/// # Example
///
/// ```rust
/// use task_sim::core::{SimError, TaskKind, TaskRunner};
/// use task_sim::util::TaskHandle;
///
/// struct Inline;
///
/// impl TaskRunner for Inline {
///     fn spawn(&self, _kind: TaskKind) -> Result<TaskHandle, SimError> {
///         Ok(TaskHandle(0))
///     }
///     fn terminate(&self, _handle: TaskHandle) -> Result<(), SimError> {
///         Ok(())
///     }
///     fn run_foreground(&self, _kind: TaskKind) -> Result<(), SimError> {
///         Ok(())
///     }
///     fn live_workers(&self) -> usize {
///         0
///     }
/// }
/// ```
pub trait TaskRunner: Send + Sync {
    /// Start a background unit of work for `kind`.
    ///
    /// # Errors
    ///
    /// [`SimError::Spawn`] when the worker cannot be started; nothing is registered.
    fn spawn(&self, kind: TaskKind) -> Result<TaskHandle, SimError>;

    /// Stop the worker behind `handle`.
    ///
    /// Must be idempotent: stopping a handle that already exited or was
    /// already terminated returns `Ok(())`.
    ///
    /// # Errors
    ///
    /// [`SimError::Terminate`] when the worker could not be stopped cleanly.
    fn terminate(&self, handle: TaskHandle) -> Result<(), SimError>;

    /// Run `kind` synchronously on the caller's thread.
    ///
    /// # Errors
    ///
    /// Whatever the foreground routine reports.
    fn run_foreground(&self, kind: TaskKind) -> Result<(), SimError>;

    /// Number of workers started and not yet terminated.
    fn live_workers(&self) -> usize;
}

/// Type-erased runner chosen at runtime from configuration.
pub type BoxedRunner = Box<dyn TaskRunner>;

impl<T: TaskRunner + ?Sized> TaskRunner for Box<T> {
    fn spawn(&self, kind: TaskKind) -> Result<TaskHandle, SimError> {
        (**self).spawn(kind)
    }

    fn terminate(&self, handle: TaskHandle) -> Result<(), SimError> {
        (**self).terminate(handle)
    }

    fn run_foreground(&self, kind: TaskKind) -> Result<(), SimError> {
        (**self).run_foreground(kind)
    }

    fn live_workers(&self) -> usize {
        (**self).live_workers()
    }
}

impl<T: TaskRunner + ?Sized> TaskRunner for std::sync::Arc<T> {
    fn spawn(&self, kind: TaskKind) -> Result<TaskHandle, SimError> {
        (**self).spawn(kind)
    }

    fn terminate(&self, handle: TaskHandle) -> Result<(), SimError> {
        (**self).terminate(handle)
    }

    fn run_foreground(&self, kind: TaskKind) -> Result<(), SimError> {
        (**self).run_foreground(kind)
    }

    fn live_workers(&self) -> usize {
        (**self).live_workers()
    }
}

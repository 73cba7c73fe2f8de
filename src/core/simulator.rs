//! Simulator session: the owned state behind every operator action.
//!
//! A [`Simulator`] owns the task registry, the resource ledger, the scheduler
//! and the task runner for one session. All registry mutations take the
//! registry write lock, and every ledger mutation happens while that lock is
//! held, so check+allocate on creation and evict+release on close/tick are
//! atomic pairs. Listing takes the read lock only.
//!
//! ```rust
//! use task_sim::core::{ExecMode, LaunchOutcome, SessionLimits, Scheduler, Simulator, TaskKind};
//! use task_sim::runtime::SimulatedRunner;
//! use task_sim::util::ResourceQuote;
//!
//! let limits = SessionLimits::new(ResourceQuote::new(512, 256, 4), 50);
//! let sim = Simulator::new(limits, Scheduler::default(), SimulatedRunner::new()).unwrap();
//!
//! let outcome = sim.launch(TaskKind::Notepad, ExecMode::Background).unwrap();
//! assert!(matches!(outcome, LaunchOutcome::Registered(_)));
//! assert_eq!(sim.list().len(), 1);
//!
//! sim.close(0).unwrap();
//! assert_eq!(sim.snapshot().available, sim.snapshot().total);
//! ```

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::core::audit::{build_audit_event, AuditAction, AuditSink};
use crate::core::{
    ExecMode, LedgerSnapshot, ResourceLedger, Scheduler, SchedulingInfo, SchedulingPolicy, SimError,
    Task, TaskKind, TaskRegistry, TaskRunner, TaskSpec, TaskView, TickReport,
};
use crate::util::serde::{ResourceQuote, TaskHandle, TaskId};

/// Default registry capacity.
pub const DEFAULT_MAX_TASKS: usize = 50;

/// Capacity limits and random draw ranges for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLimits {
    /// Ledger totals.
    pub total: ResourceQuote,
    /// Registry capacity.
    pub max_tasks: usize,
    /// Priorities drawn for background launches.
    pub priority_range: RangeInclusive<i32>,
    /// Burst lengths (initial remaining time) drawn for background launches.
    pub burst_range: RangeInclusive<i32>,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl SessionLimits {
    /// Limits with the default draw ranges (priority 1-5, burst 1-10).
    #[must_use]
    pub fn new(total: ResourceQuote, max_tasks: usize) -> Self {
        Self {
            total,
            max_tasks,
            priority_range: 1..=5,
            burst_range: 1..=10,
            seed: None,
        }
    }

    /// Use a fixed RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<(), SimError> {
        if self.max_tasks == 0 {
            return Err(SimError::InvalidConfig("max_tasks must be greater than 0".into()));
        }
        if self.priority_range.is_empty() {
            return Err(SimError::InvalidConfig("priority range is empty".into()));
        }
        if self.burst_range.is_empty() {
            return Err(SimError::InvalidConfig("burst range is empty".into()));
        }
        if *self.burst_range.start() <= 0 {
            return Err(SimError::InvalidConfig("burst range must start above 0".into()));
        }
        Ok(())
    }
}

/// Result of a launch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The foreground routine ran to completion.
    Ran,
    /// A background task was registered.
    Registered(TaskId),
}

/// One simulator session.
pub struct Simulator<R: TaskRunner> {
    limits: SessionLimits,
    registry: RwLock<TaskRegistry>,
    ledger: ResourceLedger,
    scheduler: Mutex<Scheduler>,
    runner: R,
    next_id: AtomicU64,
    rng: Mutex<StdRng>,
    audit: Option<Mutex<Box<dyn AuditSink>>>,
    closed: AtomicBool,
}

impl<R: TaskRunner> Simulator<R> {
    /// Start a session.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] when the limits are unusable or the
    /// quantum is not positive.
    pub fn new(limits: SessionLimits, scheduler: Scheduler, runner: R) -> Result<Self, SimError> {
        limits.validate()?;
        if scheduler.quantum() <= 0 {
            return Err(SimError::InvalidConfig("quantum must be greater than 0".into()));
        }
        let rng = limits
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        info!(
            total = %limits.total,
            max_tasks = limits.max_tasks,
            policy = %scheduler.policy(),
            "simulator session started"
        );
        Ok(Self {
            registry: RwLock::new(TaskRegistry::new(limits.max_tasks)),
            ledger: ResourceLedger::new(limits.total),
            scheduler: Mutex::new(scheduler),
            runner,
            next_id: AtomicU64::new(1),
            rng: Mutex::new(rng),
            audit: None,
            closed: AtomicBool::new(false),
            limits,
        })
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Mutex::new(audit));
        self
    }

    /// Session limits.
    #[must_use]
    pub const fn limits(&self) -> &SessionLimits {
        &self.limits
    }

    /// The task runner.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// True once [`Self::shutdown`] has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Task creation front-door.
    ///
    /// Both modes first check that the kind's quote fits. Foreground runs the
    /// routine on the caller's thread with no accounting. Background spawns a
    /// worker, draws priority and burst length, then registers the task; if
    /// registration fails the worker is terminated before the error returns.
    ///
    /// # Errors
    ///
    /// [`SimError::ResourceExhausted`], [`SimError::CapacityExceeded`],
    /// [`SimError::Spawn`], [`SimError::SessionClosed`], or the foreground
    /// routine's error.
    pub fn launch(&self, kind: TaskKind, mode: ExecMode) -> Result<LaunchOutcome, SimError> {
        self.ensure_open()?;
        if let Err(e) = self.ledger.ensure_available(&kind.quote()) {
            self.record(AuditAction::Reject, None, Some(kind.name()), Some(e.to_string()));
            return Err(e);
        }

        match mode {
            ExecMode::Foreground => {
                debug!(kind = %kind, "running in foreground");
                self.runner.run_foreground(kind)?;
                Ok(LaunchOutcome::Ran)
            }
            ExecMode::Background => {
                let handle = self.runner.spawn(kind).inspect_err(|e| {
                    self.record(AuditAction::Reject, None, Some(kind.name()), Some(e.to_string()));
                })?;
                let (priority, remaining) = self.draw();
                match self.create(TaskSpec::for_kind(kind, priority, remaining, handle)) {
                    Ok(id) => Ok(LaunchOutcome::Registered(id)),
                    Err(e) => {
                        self.terminate_quietly(handle);
                        Err(e)
                    }
                }
            }
        }
    }

    /// Register a task whose worker is already running.
    ///
    /// Capacity is checked before the ledger, so a full registry never
    /// allocates. The caller still owns `spec.handle` on error.
    ///
    /// # Errors
    ///
    /// [`SimError::SessionClosed`], [`SimError::CapacityExceeded`] or
    /// [`SimError::ResourceExhausted`]; the ledger is unchanged in every case.
    pub fn create(&self, spec: TaskSpec) -> Result<TaskId, SimError> {
        let mut registry = self.registry.write();
        self.ensure_open()?;

        if registry.is_full() {
            let err = SimError::CapacityExceeded {
                max: registry.capacity(),
            };
            warn!(name = %spec.name, "task rejected: registry full");
            self.record(AuditAction::Reject, None, Some(&spec.name), Some(err.to_string()));
            return Err(err);
        }
        if let Err(e) = self.ledger.try_allocate(&spec.quote) {
            warn!(name = %spec.name, error = %e, "task rejected: insufficient resources");
            self.record(AuditAction::Reject, None, Some(&spec.name), Some(e.to_string()));
            return Err(e);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let task = Task::new(id, spec);
        let quote = task.quote();
        if let Err(e) = registry.push(task) {
            self.ledger.release(&quote);
            return Err(e);
        }
        if let Ok(task) = registry.get(registry.len() - 1) {
            info!(
                task_id = id,
                name = task.name(),
                priority = task.priority,
                burst = task.remaining,
                "task started"
            );
            self.record(AuditAction::Create, Some(id), Some(task.name()), None);
        }
        Ok(id)
    }

    /// Close the task at `index`: terminate its worker, release its quote,
    /// and compact the registry.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidIndex`] if `index` is out of range or not running.
    pub fn close(&self, index: usize) -> Result<TaskView, SimError> {
        let mut registry = self.registry.write();
        let task = registry.remove(index)?;
        let detail = self.runner.terminate(task.handle()).err().map(|e| {
            warn!(task_id = task.id(), error = %e, "worker did not terminate cleanly");
            e.to_string()
        });
        self.ledger.release(&task.quote());
        info!(task_id = task.id(), name = task.name(), "task closed");
        self.record(AuditAction::Close, Some(task.id()), Some(task.name()), detail);
        Ok(TaskView::new(index, &task))
    }

    /// Mark the task at `index` minimized.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidIndex`] if `index` is out of range or not running.
    pub fn minimize(&self, index: usize) -> Result<(), SimError> {
        self.set_minimized(index, true)
    }

    /// Clear the minimized flag of the task at `index`.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidIndex`] if `index` is out of range or not running.
    pub fn restore(&self, index: usize) -> Result<(), SimError> {
        self.set_minimized(index, false)
    }

    fn set_minimized(&self, index: usize, minimized: bool) -> Result<(), SimError> {
        let mut registry = self.registry.write();
        let task = registry.get_mut(index)?;
        task.minimized = minimized;
        let action = if minimized {
            AuditAction::Minimize
        } else {
            AuditAction::Restore
        };
        debug!(task_id = task.id(), minimized, "task visibility changed");
        self.record(action, Some(task.id()), Some(task.name()), None);
        Ok(())
    }

    /// Snapshot of the registry in scheduling order.
    #[must_use]
    pub fn list(&self) -> Vec<TaskView> {
        let registry = self.registry.read();
        registry
            .iter()
            .enumerate()
            .map(|(index, task)| TaskView::new(index, task))
            .collect()
    }

    /// Number of registered tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    /// True when no task is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }

    /// Ledger totals and availability.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        let _registry = self.registry.read();
        self.ledger.snapshot()
    }

    /// Active scheduling policy.
    #[must_use]
    pub fn policy(&self) -> SchedulingPolicy {
        self.scheduler.lock().policy()
    }

    /// Switch scheduling policy; the registry is reordered by the next tick.
    pub fn set_policy(&self, policy: SchedulingPolicy) {
        let previous = {
            let mut scheduler = self.scheduler.lock();
            let previous = scheduler.policy();
            scheduler.set_policy(policy);
            previous
        };
        if previous != policy {
            self.record(
                AuditAction::Policy,
                None,
                None,
                Some(format!("{previous} -> {policy}")),
            );
        }
    }

    /// Policy, Round Robin parameters and the registry in scheduling order.
    #[must_use]
    pub fn scheduling_info(&self) -> SchedulingInfo {
        let scheduler = *self.scheduler.lock();
        SchedulingInfo {
            policy: scheduler.policy(),
            quantum: scheduler.quantum(),
            charge: scheduler.charge(),
            queue: self.list(),
        }
    }

    /// Apply the active policy once. No-op on an empty registry.
    pub fn tick(&self) -> TickReport {
        let scheduler = *self.scheduler.lock();
        let mut registry = self.registry.write();
        let report = scheduler.tick(&mut registry, &self.ledger, &self.runner);
        drop(registry);

        if let Some(task) = report.evicted.as_ref() {
            self.record(
                AuditAction::Evict,
                Some(task.id()),
                Some(task.name()),
                report.terminate_error.as_ref().map(ToString::to_string),
            );
        }
        report
    }

    /// Launch `kinds` in the background, as the boot sequence does.
    ///
    /// Failures are logged and skipped; the ids of registered tasks are returned.
    pub fn boot(&self, kinds: &[TaskKind]) -> Vec<TaskId> {
        kinds
            .iter()
            .filter_map(|&kind| match self.launch(kind, ExecMode::Background) {
                Ok(LaunchOutcome::Registered(id)) => Some(id),
                Ok(LaunchOutcome::Ran) => None,
                Err(e) => {
                    warn!(kind = %kind, error = %e, "boot task failed to start");
                    None
                }
            })
            .collect()
    }

    /// Force-close every task and close the session.
    ///
    /// Individual termination failures are logged and ignored. Later calls
    /// return `0`. Returns the number of tasks closed.
    pub fn shutdown(&self) -> usize {
        let mut registry = self.registry.write();
        if self.closed.swap(true, Ordering::AcqRel) {
            return 0;
        }

        let tasks = registry.drain_all();
        for task in &tasks {
            if let Err(e) = self.runner.terminate(task.handle()) {
                warn!(
                    task_id = task.id(),
                    error = %e,
                    "ignoring termination failure during shutdown"
                );
            }
            self.ledger.release(&task.quote());
        }
        drop(registry);

        info!(closed = tasks.len(), "simulator session shut down");
        self.record(
            AuditAction::Shutdown,
            None,
            None,
            Some(format!("{} tasks closed", tasks.len())),
        );
        tasks.len()
    }

    fn ensure_open(&self) -> Result<(), SimError> {
        if self.is_closed() {
            Err(SimError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn draw(&self) -> (i32, i32) {
        let mut rng = self.rng.lock();
        let priority = rng.random_range(self.limits.priority_range.clone());
        let burst = rng.random_range(self.limits.burst_range.clone());
        (priority, burst)
    }

    fn terminate_quietly(&self, handle: TaskHandle) {
        if let Err(e) = self.runner.terminate(handle) {
            warn!(%handle, error = %e, "failed to terminate unregistered worker");
        }
    }

    fn record(
        &self,
        action: AuditAction,
        task_id: Option<TaskId>,
        task_name: Option<&str>,
        detail: Option<String>,
    ) {
        if let Some(audit) = &self.audit {
            audit
                .lock()
                .record(build_audit_event(action, task_id, task_name, detail));
        }
    }
}

impl<R: TaskRunner> Drop for Simulator<R> {
    fn drop(&mut self) {
        if !self.is_closed() {
            debug!("simulator dropped without explicit shutdown");
            self.shutdown();
        }
    }
}

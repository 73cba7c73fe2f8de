//! # task_sim
//!
//! A single-process simulator of a multitasking operating system's process and
//! resource manager and its CPU scheduler.
//!
//! The core is a fixed-capacity task registry, a resource ledger holding RAM,
//! disk and CPU-core budgets, and a pluggable scheduling policy (FCFS, Round
//! Robin, Priority) that reorders or evicts tasks on every tick and keeps the
//! ledger reconciled. Everything a task actually does is delegated to a
//! [`core::TaskRunner`]: OS threads, tokio tasks, or an in-memory table.
//!
//! ## Key Features
//!
//! - **Atomic accounting**: check-and-allocate and evict-and-release happen
//!   under the registry write lock, so the ledger always equals total minus
//!   the sum of live quotes
//! - **Leak-free front-door**: a worker whose registration fails is
//!   terminated before the error is returned
//! - **Pluggable runners**: native threads, tokio, or simulated handles
//! - **Audit journal**: every lifecycle change can be recorded to a sink
//!
//! ## Quick Start
//!
//! ```rust
//! use task_sim::core::{ExecMode, Scheduler, SchedulingPolicy, SessionLimits, Simulator, TaskKind};
//! use task_sim::runtime::SimulatedRunner;
//! use task_sim::util::ResourceQuote;
//!
//! let limits = SessionLimits::new(ResourceQuote::new(1024, 512, 4), 50).with_seed(3);
//! let sim = Simulator::new(limits, Scheduler::default(), SimulatedRunner::new()).unwrap();
//!
//! sim.launch(TaskKind::Calendar, ExecMode::Background).unwrap();
//! sim.launch(TaskKind::Time, ExecMode::Background).unwrap();
//! sim.set_policy(SchedulingPolicy::Priority);
//! sim.tick();
//!
//! let queue = sim.list();
//! assert!(queue[0].priority >= queue[1].priority);
//! assert_eq!(sim.shutdown(), 2);
//! ```
//!
//! Sessions are usually assembled from a [`config::SimConfig`] with
//! [`builders::build_session`]; the `task-sim` binary wraps one in the
//! [`console::Console`] menu.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Task lifecycle, resource accounting and scheduling.
pub mod core;
/// Configuration models for capacity, scheduling and runners.
pub mod config;
/// Builders to construct simulator sessions from configuration.
pub mod builders;
/// Text menu front-end.
pub mod console;
/// Task runners and the status API.
pub mod runtime;
/// Shared utilities.
pub mod util;

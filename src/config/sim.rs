//! Session configuration structures.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{
    QuantumCharge, Scheduler, SchedulingPolicy, SessionLimits, SimError, TaskKind,
    DEFAULT_MAX_TASKS, DEFAULT_QUANTUM,
};
use crate::util::serde::ResourceQuote;

/// Prefix of the environment variables read by [`SimConfig::from_env`].
pub const ENV_PREFIX: &str = "TASK_SIM_";

/// Machine capacity handed to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// RAM in MB.
    pub ram: u32,
    /// Disk in MB.
    pub disk: u32,
    /// CPU cores.
    pub cores: u32,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            ram: 4096,
            disk: 1024,
            cores: u32::try_from(num_cpus::get()).unwrap_or(u32::MAX),
        }
    }
}

impl From<ResourceConfig> for ResourceQuote {
    fn from(cfg: ResourceConfig) -> Self {
        Self::new(cfg.ram, cfg.disk, cfg.cores)
    }
}

/// Scheduling policy and Round Robin parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Policy active at session start.
    pub policy: SchedulingPolicy,
    /// Round Robin quantum.
    pub quantum: i32,
    /// Which task a Round Robin tick charges.
    pub quantum_charge: QuantumCharge,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            policy: SchedulingPolicy::default(),
            quantum: DEFAULT_QUANTUM,
            quantum_charge: QuantumCharge::default(),
        }
    }
}

/// Ranges for the priority and burst drawn on background launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Lowest priority drawn.
    pub priority_min: i32,
    /// Highest priority drawn.
    pub priority_max: i32,
    /// Shortest burst drawn.
    pub burst_min: i32,
    /// Longest burst drawn.
    pub burst_max: i32,
    /// Fixed RNG seed for reproducible sessions.
    pub seed: Option<u64>,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            priority_min: 1,
            priority_max: 5,
            burst_min: 1,
            burst_max: 10,
            seed: None,
        }
    }
}

/// Runner backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerConfig {
    /// One OS thread per background task.
    #[default]
    Threads,
    /// One tokio task per background task.
    Tokio,
    /// In-memory handles only.
    Simulated,
}

impl std::str::FromStr for RunnerConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "threads" | "thread" | "native" => Ok(Self::Threads),
            "tokio" => Ok(Self::Tokio),
            "simulated" | "sim" => Ok(Self::Simulated),
            other => Err(format!("unknown runner `{other}`")),
        }
    }
}

/// Root session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Machine capacity.
    pub resources: ResourceConfig,
    /// Registry capacity.
    pub max_tasks: usize,
    /// Scheduler settings.
    pub scheduler: SchedulerSettings,
    /// Random draw settings.
    pub draws: DrawConfig,
    /// Runner backend.
    pub runner: RunnerConfig,
    /// Kinds launched in the background when the session boots.
    pub boot_tasks: Vec<TaskKind>,
    /// Audit events kept in memory; `0` disables the journal.
    pub audit_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            resources: ResourceConfig::default(),
            max_tasks: DEFAULT_MAX_TASKS,
            scheduler: SchedulerSettings::default(),
            draws: DrawConfig::default(),
            runner: RunnerConfig::default(),
            boot_tasks: vec![TaskKind::Calendar],
            audit_capacity: 256,
        }
    }
}

impl SimConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |msg: &str| Err(SimError::InvalidConfig(msg.to_string()));
        if self.max_tasks == 0 {
            return invalid("max_tasks must be greater than 0");
        }
        if self.scheduler.quantum <= 0 {
            return invalid("scheduler.quantum must be greater than 0");
        }
        if self.draws.priority_min > self.draws.priority_max {
            return invalid("draws.priority_min must not exceed draws.priority_max");
        }
        if self.draws.burst_min > self.draws.burst_max {
            return invalid("draws.burst_min must not exceed draws.burst_max");
        }
        if self.draws.burst_min <= 0 {
            return invalid("draws.burst_min must be greater than 0");
        }
        if cfg!(not(feature = "tokio-runtime")) && self.runner == RunnerConfig::Tokio {
            return invalid("runner `tokio` requires the tokio-runtime feature");
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] on parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, SimError> {
        let cfg: Self = serde_json::from_str(input)
            .map_err(|e| SimError::InvalidConfig(format!("parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON configuration file.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] when the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| SimError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&input)
    }

    /// Defaults overridden by `TASK_SIM_*` variables, after loading `.env`
    /// if one exists.
    ///
    /// Recognised: `RAM`, `DISK`, `CORES`, `MAX_TASKS`, `POLICY`, `QUANTUM`,
    /// `QUANTUM_CHARGE`, `RUNNER`, `SEED`, `AUDIT_CAPACITY`.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] when a variable does not parse or the
    /// result fails validation.
    pub fn from_env() -> Result<Self, SimError> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();
        cfg.apply_env(|key| env::var(format!("{ENV_PREFIX}{key}")).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply overrides from `lookup`, keyed without the prefix.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] when a value does not parse.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), SimError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "RAM")? {
            self.resources.ram = v;
        }
        if let Some(v) = parse_var(&lookup, "DISK")? {
            self.resources.disk = v;
        }
        if let Some(v) = parse_var(&lookup, "CORES")? {
            self.resources.cores = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_TASKS")? {
            self.max_tasks = v;
        }
        if let Some(v) = parse_var(&lookup, "POLICY")? {
            self.scheduler.policy = v;
        }
        if let Some(v) = parse_var(&lookup, "QUANTUM")? {
            self.scheduler.quantum = v;
        }
        if let Some(v) = lookup("QUANTUM_CHARGE") {
            self.scheduler.quantum_charge = match v.trim().to_ascii_lowercase().as_str() {
                "incoming" => QuantumCharge::Incoming,
                "outgoing" => QuantumCharge::Outgoing,
                other => {
                    return Err(SimError::InvalidConfig(format!(
                        "{ENV_PREFIX}QUANTUM_CHARGE: unknown value `{other}`"
                    )))
                }
            };
        }
        if let Some(v) = parse_var(&lookup, "RUNNER")? {
            self.runner = v;
        }
        if let Some(v) = parse_var(&lookup, "SEED")? {
            self.draws.seed = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "AUDIT_CAPACITY")? {
            self.audit_capacity = v;
        }
        Ok(())
    }

    /// Session limits for the simulator.
    #[must_use]
    pub fn to_limits(&self) -> SessionLimits {
        let mut limits = SessionLimits::new(self.resources.into(), self.max_tasks);
        limits.priority_range = self.draws.priority_min..=self.draws.priority_max;
        limits.burst_range = self.draws.burst_min..=self.draws.burst_max;
        limits.seed = self.draws.seed;
        limits
    }

    /// Scheduler for the simulator.
    #[must_use]
    pub const fn to_scheduler(&self) -> Scheduler {
        Scheduler::new(
            self.scheduler.policy,
            self.scheduler.quantum,
            self.scheduler.quantum_charge,
        )
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, SimError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| SimError::InvalidConfig(format!("{ENV_PREFIX}{key}: {e}")))
        })
        .transpose()
}

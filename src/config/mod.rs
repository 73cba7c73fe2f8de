//! Configuration models for capacity, scheduling and runners.

pub mod sim;

pub use sim::{
    DrawConfig, ResourceConfig, RunnerConfig, SchedulerSettings, SimConfig, ENV_PREFIX,
};

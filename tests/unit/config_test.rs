//! Tests for configuration validation

use task_sim::config::{RunnerConfig, SimConfig};
use task_sim::core::{QuantumCharge, SchedulingPolicy, TaskKind, DEFAULT_MAX_TASKS, DEFAULT_QUANTUM};
use task_sim::util::ResourceQuote;

#[test]
fn test_defaults_are_valid() {
    let cfg = SimConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.max_tasks, DEFAULT_MAX_TASKS);
    assert_eq!(cfg.scheduler.quantum, DEFAULT_QUANTUM);
    assert_eq!(cfg.scheduler.policy, SchedulingPolicy::Fcfs);
    assert_eq!(cfg.scheduler.quantum_charge, QuantumCharge::Incoming);
    assert_eq!(cfg.boot_tasks, vec![TaskKind::Calendar]);
    assert!(cfg.resources.cores >= 1);
}

#[test]
fn test_invalid_max_tasks() {
    let cfg = SimConfig {
        max_tasks: 0,
        ..SimConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_quantum() {
    let mut cfg = SimConfig::default();
    cfg.scheduler.quantum = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_draw_ranges() {
    let mut cfg = SimConfig::default();
    cfg.draws.priority_min = 6;
    assert!(cfg.validate().is_err());

    let mut cfg = SimConfig::default();
    cfg.draws.burst_min = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_from_json_partial() {
    let json = r#"{
        "resources": { "ram": 512, "disk": 128, "cores": 2 },
        "scheduler": { "policy": "round_robin", "quantum_charge": "outgoing" },
        "runner": "simulated",
        "boot_tasks": ["calendar", "time"],
        "draws": { "seed": 11 }
    }"#;
    let cfg = SimConfig::from_json_str(json).unwrap();
    assert_eq!(ResourceQuote::from(cfg.resources), ResourceQuote::new(512, 128, 2));
    assert_eq!(cfg.scheduler.policy, SchedulingPolicy::RoundRobin);
    assert_eq!(cfg.scheduler.quantum, DEFAULT_QUANTUM);
    assert_eq!(cfg.scheduler.quantum_charge, QuantumCharge::Outgoing);
    assert_eq!(cfg.runner, RunnerConfig::Simulated);
    assert_eq!(cfg.boot_tasks, vec![TaskKind::Calendar, TaskKind::Time]);
    assert_eq!(cfg.draws.seed, Some(11));
    assert_eq!(cfg.draws.priority_max, 5);
}

#[test]
fn test_from_json_rejects_invalid() {
    assert!(SimConfig::from_json_str("{ not json").is_err());
    assert!(SimConfig::from_json_str(r#"{ "max_tasks": 0 }"#).is_err());
    assert!(SimConfig::from_json_str(r#"{ "runner": "cluster" }"#).is_err());
}

#[test]
fn test_from_json_file_missing() {
    let err = SimConfig::from_json_file("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("here.json"));
}

#[test]
fn test_to_limits_and_scheduler() {
    let mut cfg = SimConfig::default();
    cfg.draws.priority_min = 2;
    cfg.draws.priority_max = 3;
    cfg.draws.seed = Some(5);
    cfg.scheduler.policy = SchedulingPolicy::Priority;

    let limits = cfg.to_limits();
    assert_eq!(limits.priority_range, 2..=3);
    assert_eq!(limits.burst_range, 1..=10);
    assert_eq!(limits.seed, Some(5));
    assert_eq!(limits.max_tasks, cfg.max_tasks);

    let scheduler = cfg.to_scheduler();
    assert_eq!(scheduler.policy(), SchedulingPolicy::Priority);
    assert_eq!(scheduler.quantum(), DEFAULT_QUANTUM);
}

#[test]
fn test_runner_from_str() {
    assert_eq!("threads".parse::<RunnerConfig>(), Ok(RunnerConfig::Threads));
    assert_eq!("Tokio".parse::<RunnerConfig>(), Ok(RunnerConfig::Tokio));
    assert_eq!("sim".parse::<RunnerConfig>(), Ok(RunnerConfig::Simulated));
    assert!("gpu".parse::<RunnerConfig>().is_err());
}

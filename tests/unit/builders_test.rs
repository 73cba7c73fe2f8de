//! Tests for builder modules

use task_sim::builders::{build_runner, build_session, build_simulator};
use task_sim::config::{ResourceConfig, RunnerConfig, SimConfig};
use task_sim::core::{AuditAction, ExecMode, TaskKind, TaskRunner};
use task_sim::util::ResourceQuote;

/// Fixed capacity so results do not depend on the host's core count.
fn simulated_config() -> SimConfig {
    let mut cfg = SimConfig {
        resources: ResourceConfig {
            ram: 4096,
            disk: 1024,
            cores: 8,
        },
        runner: RunnerConfig::Simulated,
        ..SimConfig::default()
    };
    cfg.draws.seed = Some(1);
    cfg
}

#[test]
fn test_build_simulator_from_config() {
    let mut cfg = simulated_config();
    cfg.max_tasks = 3;
    let sim = build_simulator(&cfg).unwrap();
    assert_eq!(sim.limits().max_tasks, 3);
    assert_eq!(sim.snapshot().total, ResourceQuote::from(cfg.resources));
    assert_eq!(sim.policy(), cfg.scheduler.policy);
}

#[test]
fn test_build_simulator_rejects_invalid_config() {
    let cfg = SimConfig {
        max_tasks: 0,
        ..simulated_config()
    };
    assert!(build_simulator(&cfg).is_err());
}

#[test]
fn test_build_session_with_journal() {
    let cfg = simulated_config();
    let session = build_session(&cfg).unwrap();
    let booted = session.simulator.boot(&cfg.boot_tasks);
    assert_eq!(booted.len(), 1);

    let journal = session.journal.as_ref().unwrap();
    assert_eq!(journal.lock().actions(), vec![AuditAction::Create]);
}

#[test]
fn test_build_session_without_journal() {
    let cfg = SimConfig {
        audit_capacity: 0,
        ..simulated_config()
    };
    let session = build_session(&cfg).unwrap();
    assert!(session.journal.is_none());
}

#[test]
fn test_build_thread_runner() {
    let runner = build_runner(RunnerConfig::Threads).unwrap();
    let handle = runner.spawn(TaskKind::Time).unwrap();
    assert_eq!(runner.live_workers(), 1);
    runner.terminate(handle).unwrap();
    assert_eq!(runner.live_workers(), 0);
}

#[test]
fn test_threaded_session_end_to_end() {
    let cfg = SimConfig {
        runner: RunnerConfig::Threads,
        ..simulated_config()
    };
    let sim = build_simulator(&cfg).unwrap();
    assert_eq!(sim.snapshot().total.cores, 8);
    sim.boot(&[TaskKind::Calendar, TaskKind::Time, TaskKind::Notepad]);
    assert_eq!(sim.len(), 3);
    assert_eq!(sim.runner().live_workers(), 3);
    sim.launch(TaskKind::Calculator, ExecMode::Foreground).unwrap();
    assert_eq!(sim.len(), 3);
    assert_eq!(sim.shutdown(), 3);
    assert_eq!(sim.runner().live_workers(), 0);
}

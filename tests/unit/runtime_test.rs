//! Tests for runners and the status API

use task_sim::core::{
    ExecMode, Scheduler, SchedulingPolicy, SessionLimits, Simulator, TaskKind, TaskRunner,
};
use task_sim::runtime::{health, session_status, SimulatedRunner};
use task_sim::util::ResourceQuote;

fn sim() -> Simulator<SimulatedRunner> {
    let limits = SessionLimits::new(ResourceQuote::new(1000, 1000, 8), 50).with_seed(2);
    Simulator::new(limits, Scheduler::default(), SimulatedRunner::new()).unwrap()
}

#[test]
fn test_session_status_reflects_state() {
    let sim = sim();
    sim.launch(TaskKind::Notepad, ExecMode::Background).unwrap();
    sim.launch(TaskKind::Time, ExecMode::Background).unwrap();
    sim.set_policy(SchedulingPolicy::RoundRobin);

    let status = session_status(&sim);
    assert_eq!(status.policy, SchedulingPolicy::RoundRobin);
    assert_eq!(status.tasks.len(), 2);
    assert_eq!(status.live_workers, 2);
    assert_eq!(status.ledger.used(), ResourceQuote::new(60, 6, 2));
    assert!(!status.closed);
}

#[test]
fn test_session_status_serializes() {
    let sim = sim();
    sim.launch(TaskKind::Calendar, ExecMode::Background).unwrap();
    let json = serde_json::to_value(session_status(&sim)).unwrap();
    assert_eq!(json["policy"], "fcfs");
    assert_eq!(json["tasks"][0]["kind"], "calendar");
    assert_eq!(json["tasks"][0]["quote"]["ram"], 15);
    assert_eq!(json["ledger"]["available"]["ram"], 985);
}

#[test]
fn test_health_tracks_shutdown() {
    let sim = sim();
    sim.launch(TaskKind::Calendar, ExecMode::Background).unwrap();
    let before = health(&sim);
    assert!(before.ok);
    assert_eq!(before.tasks, 1);

    sim.shutdown();
    let after = health(&sim);
    assert!(!after.ok);
    assert_eq!(after.tasks, 0);
}

#[test]
fn test_simulated_runner_limit_blocks_registration() {
    let limits = SessionLimits::new(ResourceQuote::new(1000, 1000, 8), 50);
    let sim = Simulator::new(
        limits,
        Scheduler::default(),
        SimulatedRunner::new().with_spawn_limit(1),
    )
    .unwrap();
    sim.launch(TaskKind::Time, ExecMode::Background).unwrap();
    let before = sim.snapshot();
    assert!(sim.launch(TaskKind::Time, ExecMode::Background).is_err());
    assert_eq!(sim.snapshot(), before);
    assert_eq!(sim.len(), 1);
    assert_eq!(sim.runner().live_workers(), 1);
}

#[cfg(feature = "tokio-runtime")]
#[tokio::test(flavor = "multi_thread")]
async fn test_tokio_runner_session() {
    use task_sim::runtime::TokioRunner;

    let limits = SessionLimits::new(ResourceQuote::new(1000, 1000, 8), 50).with_seed(4);
    let runner = TokioRunner::from_current().unwrap();
    let sim = Simulator::new(limits, Scheduler::default(), runner).unwrap();
    sim.boot(&[TaskKind::Calendar, TaskKind::Time]);
    assert_eq!(sim.runner().live_workers(), 2);
    sim.close(0).unwrap();
    assert_eq!(sim.runner().live_workers(), 1);
    assert_eq!(sim.shutdown(), 1);
    assert_eq!(sim.runner().live_workers(), 0);
}

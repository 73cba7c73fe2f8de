//! Tests for audit sinks

use std::sync::Arc;

use parking_lot::Mutex;
use task_sim::core::{
    build_audit_event, AuditAction, AuditSink, ExecMode, InMemoryAuditSink, Scheduler,
    SchedulingPolicy, SessionLimits, Simulator, TaskKind,
};
use task_sim::runtime::SimulatedRunner;
use task_sim::util::ResourceQuote;

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);
    sink.record(build_audit_event(
        AuditAction::Create,
        Some(1),
        Some("Notepad"),
        None,
    ));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::Create);
    assert_eq!(events[0].task_id, Some(1));
    assert_eq!(events[0].task_name.as_deref(), Some("Notepad"));
    assert!(!events[0].event_id.is_empty());
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);
    sink.record(build_audit_event(AuditAction::Create, Some(1), None, None));
    sink.record(build_audit_event(AuditAction::Close, Some(1), None, None));
    sink.record(build_audit_event(AuditAction::Shutdown, None, None, None));

    assert_eq!(sink.actions(), vec![AuditAction::Close, AuditAction::Shutdown]);
}

#[test]
fn test_zero_capacity_records_nothing() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event(AuditAction::Create, Some(1), None, None));
    assert!(sink.events().is_empty());
}

#[test]
fn test_event_ids_are_unique() {
    let a = build_audit_event(AuditAction::Create, None, None, None);
    let b = build_audit_event(AuditAction::Create, None, None, None);
    assert_ne!(a.event_id, b.event_id);
}

#[test]
fn test_simulator_journals_lifecycle() {
    let journal = Arc::new(Mutex::new(InMemoryAuditSink::new(64)));
    let limits = SessionLimits::new(ResourceQuote::new(100, 100, 2), 50).with_seed(9);
    let sim = Simulator::new(limits, Scheduler::default(), SimulatedRunner::new())
        .unwrap()
        .with_audit(Box::new(Arc::clone(&journal)));

    sim.launch(TaskKind::Notepad, ExecMode::Background).unwrap();
    sim.minimize(0).unwrap();
    sim.restore(0).unwrap();
    // Minesweeper needs 60 MB RAM; only 50 remain.
    assert!(sim.launch(TaskKind::Minesweeper, ExecMode::Background).is_err());
    sim.set_policy(SchedulingPolicy::Priority);
    sim.set_policy(SchedulingPolicy::Priority);
    sim.close(0).unwrap();
    sim.shutdown();

    assert_eq!(
        journal.lock().actions(),
        vec![
            AuditAction::Create,
            AuditAction::Minimize,
            AuditAction::Restore,
            AuditAction::Reject,
            AuditAction::Policy,
            AuditAction::Close,
            AuditAction::Shutdown,
        ]
    );
}

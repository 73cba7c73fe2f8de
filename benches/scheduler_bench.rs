//! Benchmarks for the simulator core.
//!
//! Benchmarks cover:
//! - Background launch and close throughput
//! - One scheduling tick per policy over a full registry

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use task_sim::core::{
    ExecMode, QuantumCharge, Scheduler, SchedulingPolicy, SessionLimits, Simulator, TaskKind,
    TaskRunner, TaskSpec, DEFAULT_MAX_TASKS, DEFAULT_QUANTUM,
};
use task_sim::runtime::SimulatedRunner;
use task_sim::util::ResourceQuote;

const TOTAL: ResourceQuote = ResourceQuote::new(u32::MAX, u32::MAX, u32::MAX);

fn session(policy: SchedulingPolicy) -> Simulator<SimulatedRunner> {
    let limits = SessionLimits::new(TOTAL, DEFAULT_MAX_TASKS).with_seed(42);
    let scheduler = Scheduler::new(policy, DEFAULT_QUANTUM, QuantumCharge::Incoming);
    Simulator::new(limits, scheduler, SimulatedRunner::new()).expect("valid limits")
}

// ============================================================================
// Lifecycle
// ============================================================================

fn bench_launch_close(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");
    group.throughput(Throughput::Elements(1));
    group.bench_function("launch_close", |b| {
        let sim = session(SchedulingPolicy::Fcfs);
        b.iter(|| {
            sim.launch(black_box(TaskKind::Notepad), ExecMode::Background)
                .expect("capacity");
            sim.close(0).expect("registered");
        });
    });
    group.finish();
}

// ============================================================================
// Scheduling
// ============================================================================

fn fill(sim: &Simulator<SimulatedRunner>, len: usize) {
    for i in 0..len {
        let handle = sim.runner().spawn(TaskKind::Calculator).expect("spawn");
        let priority = i32::try_from(i % 7).unwrap_or(0);
        // Large bursts keep Round Robin from evicting during the run.
        let spec = TaskSpec::for_kind(TaskKind::Calculator, priority, i32::MAX, handle);
        sim.create(spec).expect("capacity");
    }
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for policy in SchedulingPolicy::ALL {
        for len in [10usize, DEFAULT_MAX_TASKS] {
            group.bench_with_input(BenchmarkId::new(policy.label(), len), &len, |b, &len| {
                let sim = session(policy);
                fill(&sim, len);
                b.iter(|| black_box(sim.tick()));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_launch_close, bench_tick);
criterion_main!(benches);

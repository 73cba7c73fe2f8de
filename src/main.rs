//! task-sim - interactive OS process/resource manager and CPU scheduler simulator.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use task_sim::builders::build_session;
use task_sim::config::{RunnerConfig, SimConfig};
use task_sim::console::Console;
use task_sim::core::SchedulingPolicy;
use task_sim::runtime::session_status;
use task_sim::util::init_tracing;

/// Simulate a multitasking OS: resource ledger, task table and CPU scheduler
#[derive(Parser, Debug)]
#[command(name = "task-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON configuration file; defaults and TASK_SIM_* variables otherwise
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Total RAM in MB
    #[arg(long)]
    ram: Option<u32>,

    /// Total disk in MB
    #[arg(long)]
    disk: Option<u32>,

    /// Total CPU cores
    #[arg(long)]
    cores: Option<u32>,

    /// Initial scheduling policy (fcfs, rr, priority)
    #[arg(short, long)]
    policy: Option<SchedulingPolicy>,

    /// Task runner backend (threads, tokio, simulated)
    #[arg(short, long)]
    runner: Option<RunnerConfig>,

    /// Seed for priority and burst draws
    #[arg(long)]
    seed: Option<u64>,

    /// Prompt for RAM, disk and cores before booting
    #[arg(long)]
    ask: bool,

    /// Print the booted session status as JSON and exit
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => SimConfig::from_json_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SimConfig::from_env().context("failed to read TASK_SIM_* environment")?,
    };
    apply_args(&mut cfg, &args);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    if args.ask {
        ask_capacity(&mut cfg, &mut input)?;
    }
    cfg.validate()?;

    let session = build_session(&cfg)?;
    let sim = &session.simulator;
    let booted = sim.boot(&cfg.boot_tasks);
    info!(booted = booted.len(), "boot sequence finished");

    if args.json {
        let status = session_status(sim);
        println!("{}", serde_json::to_string_pretty(&status)?);
        sim.shutdown();
        return Ok(());
    }

    println!("      Operating System Simulator\n");
    let mut console = Console::new(sim, input, io::stdout().lock());
    let closed = console.run()?;
    info!(closed, "session ended");

    if let Some(journal) = &session.journal {
        info!(events = journal.lock().events().len(), "audit journal closed");
    }
    Ok(())
}

fn apply_args(cfg: &mut SimConfig, args: &Args) {
    if let Some(ram) = args.ram {
        cfg.resources.ram = ram;
    }
    if let Some(disk) = args.disk {
        cfg.resources.disk = disk;
    }
    if let Some(cores) = args.cores {
        cfg.resources.cores = cores;
    }
    if let Some(policy) = args.policy {
        cfg.scheduler.policy = policy;
    }
    if let Some(runner) = args.runner {
        cfg.runner = runner;
    }
    if args.seed.is_some() {
        cfg.draws.seed = args.seed;
    }
}

fn ask_capacity<I: BufRead>(cfg: &mut SimConfig, input: &mut I) -> Result<()> {
    cfg.resources.ram = ask_number(input, "Enter total RAM (MB): ")?;
    cfg.resources.disk = ask_number(input, "Enter total Hard Drive space (MB): ")?;
    cfg.resources.cores = ask_number(input, "Enter number of CPU cores: ")?;
    Ok(())
}

fn ask_number<I: BufRead>(input: &mut I, message: &str) -> Result<u32> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("input closed before capacity was entered");
    }
    line.trim()
        .parse()
        .with_context(|| format!("invalid number `{}`", line.trim()))
}

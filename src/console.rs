//! Text menu driving a simulator session.
//!
//! The console only calls the simulator's public operations. Input and output
//! are generic so tests can script a whole session with an in-memory buffer.
//! End of input is treated as a shutdown request.

use std::fmt;
use std::io::{BufRead, Write};

use anyhow::Context;
use tracing::debug;

use crate::core::{
    AppResult, ExecMode, LaunchOutcome, SchedulingPolicy, SimError, Simulator, TaskKind, TaskRunner,
    TaskView,
};
use crate::util::serde::ResourceKind;

/// Menu number of the first non-launch entry.
const SHOW_TASKS: usize = 17;

/// Operator privilege level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrivilegeMode {
    /// Listing only.
    #[default]
    User,
    /// Listing plus close, minimize, restore and scheduling info.
    Kernel,
}

impl PrivilegeMode {
    const fn toggled(self) -> Self {
        match self {
            Self::User => Self::Kernel,
            Self::Kernel => Self::User,
        }
    }
}

impl fmt::Display for PrivilegeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "User",
            Self::Kernel => "Kernel",
        })
    }
}

/// One main-menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// 1-16: launch an application.
    Launch(TaskKind),
    /// 17.
    ShowTasks,
    /// 18.
    EndTask,
    /// 19.
    SwitchMode,
    /// 20.
    Shutdown,
    /// 21.
    SetScheduling,
}

impl MenuChoice {
    /// Choice for a menu number.
    #[must_use]
    pub fn from_number(n: usize) -> Option<Self> {
        match n {
            17 => Some(Self::ShowTasks),
            18 => Some(Self::EndTask),
            19 => Some(Self::SwitchMode),
            20 => Some(Self::Shutdown),
            21 => Some(Self::SetScheduling),
            n => TaskKind::from_menu(n).map(Self::Launch),
        }
    }

    /// Whether the scheduler ticks after this choice. Launches tick; 17-21 do
    /// not. Invalid input has no choice and always ticks.
    #[must_use]
    pub const fn ticks_scheduler(self) -> bool {
        matches!(self, Self::Launch(_))
    }
}

/// Interactive front-end over a [`Simulator`].
pub struct Console<'a, R: TaskRunner, I, O> {
    sim: &'a Simulator<R>,
    input: I,
    output: O,
    mode: PrivilegeMode,
}

impl<'a, R, I, O> Console<'a, R, I, O>
where
    R: TaskRunner,
    I: BufRead,
    O: Write,
{
    /// Console in user mode.
    pub const fn new(sim: &'a Simulator<R>, input: I, output: O) -> Self {
        Self {
            sim,
            input,
            output,
            mode: PrivilegeMode::User,
        }
    }

    /// Current privilege mode.
    #[must_use]
    pub const fn mode(&self) -> PrivilegeMode {
        self.mode
    }

    /// Consume the console and return its output sink.
    pub fn into_output(self) -> O {
        self.output
    }

    /// Run the menu loop until shutdown or end of input.
    ///
    /// Returns the number of tasks closed by the shutdown.
    ///
    /// # Errors
    ///
    /// I/O failures on the console streams.
    pub fn run(&mut self) -> AppResult<usize> {
        loop {
            self.render_header()?;
            self.render_menu()?;
            let Some(line) = self.prompt("Enter your choice: ")? else {
                debug!("console input closed");
                return self.shutdown();
            };
            let choice = line.trim().parse().ok().and_then(MenuChoice::from_number);

            match choice {
                None => writeln!(self.output, "Invalid choice!")?,
                Some(MenuChoice::Launch(kind)) => self.launch(kind)?,
                Some(MenuChoice::ShowTasks) => self.show_tasks()?,
                Some(MenuChoice::EndTask) => self.end_task()?,
                Some(MenuChoice::SwitchMode) => {
                    self.mode = self.mode.toggled();
                    writeln!(self.output, "Switched to {} mode.", self.mode)?;
                }
                Some(MenuChoice::Shutdown) => return self.shutdown(),
                Some(MenuChoice::SetScheduling) => self.set_scheduling()?,
            }

            if choice.is_none_or(MenuChoice::ticks_scheduler) {
                let report = self.sim.tick();
                if let Some(task) = report.evicted {
                    writeln!(
                        self.output,
                        "{} finished its burst and was closed.",
                        task.name()
                    )?;
                }
            }
        }
    }

    fn prompt(&mut self, message: &str) -> AppResult<Option<String>> {
        write!(self.output, "{message}")?;
        self.output.flush()?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read console input")?;
        Ok((read > 0).then_some(line))
    }

    fn prompt_index(&mut self, message: &str) -> AppResult<Option<i64>> {
        let Some(line) = self.prompt(message)? else {
            return Ok(None);
        };
        match line.trim().parse() {
            Ok(n) => Ok(Some(n)),
            Err(_) => {
                writeln!(self.output, "Invalid input!")?;
                Ok(None)
            }
        }
    }

    fn pause(&mut self) -> AppResult<()> {
        self.prompt("\nPress Enter to continue...")?;
        Ok(())
    }

    fn render_header(&mut self) -> AppResult<()> {
        let snap = self.sim.snapshot();
        let used = snap.used();
        writeln!(
            self.output,
            "OS Simulator - RAM: {}/{} MB | HDD: {}/{} MB | Cores: {}/{} | \
             Mode: {} | Scheduler: {}\n",
            used.ram,
            snap.total.ram,
            used.disk,
            snap.total.disk,
            used.cores,
            snap.total.cores,
            self.mode,
            self.sim.policy(),
        )?;
        Ok(())
    }

    fn render_menu(&mut self) -> AppResult<()> {
        writeln!(self.output, "=== Main Menu ===")?;
        for (i, kind) in TaskKind::ALL.iter().enumerate() {
            writeln!(self.output, "{}. {kind}", i + 1)?;
        }
        writeln!(self.output, "{SHOW_TASKS}. Show Running Tasks")?;
        writeln!(self.output, "18. End Task Immediately")?;
        writeln!(self.output, "19. Switch Mode ({})", self.mode)?;
        writeln!(self.output, "20. Shutdown")?;
        writeln!(self.output, "21. Set CPU Scheduling ({})", self.sim.policy())?;
        Ok(())
    }

    fn launch(&mut self, kind: TaskKind) -> AppResult<()> {
        // Resources are checked before asking for the mode.
        let quote = kind.quote();
        if !quote.fits_within(&self.sim.snapshot().available) {
            writeln!(self.output, "Not enough resources to start this task!")?;
            return Ok(());
        }
        let Some(answer) = self.prompt("Run in background? (y/n): ")? else {
            return Ok(());
        };
        let mode = if answer.trim().eq_ignore_ascii_case("y") {
            ExecMode::Background
        } else {
            ExecMode::Foreground
        };

        match self.sim.launch(kind, mode) {
            Ok(LaunchOutcome::Registered(_)) => {
                writeln!(self.output, "Task started in background!")?;
            }
            Ok(LaunchOutcome::Ran) => self.after_foreground(kind)?,
            Err(SimError::ResourceExhausted { .. }) => {
                writeln!(self.output, "Not enough resources to start this task!")?;
            }
            Err(SimError::CapacityExceeded { .. }) => {
                writeln!(self.output, "Maximum number of tasks reached!")?;
            }
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(())
    }

    fn after_foreground(&mut self, kind: TaskKind) -> AppResult<()> {
        match kind {
            TaskKind::SystemMonitor => {
                let snap = self.sim.snapshot();
                let used = snap.used();
                writeln!(self.output, "=== System Monitor ===")?;
                writeln!(
                    self.output,
                    "RAM: {}/{} MB ({:.1}% used)",
                    used.ram,
                    snap.total.ram,
                    snap.used_percent(ResourceKind::Ram)
                )?;
                writeln!(
                    self.output,
                    "HDD: {}/{} MB ({:.1}% used)",
                    used.disk,
                    snap.total.disk,
                    snap.used_percent(ResourceKind::Disk)
                )?;
                writeln!(self.output, "CPU Cores: {}/{} in use", used.cores, snap.total.cores)?;
            }
            TaskKind::MemoryViewer => {
                let snap = self.sim.snapshot();
                writeln!(self.output, "=== Memory Viewer ===")?;
                writeln!(self.output, "Total RAM: {} MB", snap.total.ram)?;
                writeln!(self.output, "Used RAM: {} MB", snap.used().ram)?;
                writeln!(self.output, "Free RAM: {} MB", snap.available.ram)?;
                for view in self.sim.list() {
                    writeln!(self.output, "{:<20}: {:>4} MB", view.name, view.quote.ram)?;
                }
            }
            _ => writeln!(self.output, "{kind} closed.")?,
        }
        Ok(())
    }

    fn show_tasks(&mut self) -> AppResult<()> {
        writeln!(self.output, "\n=== Running Tasks ===")?;
        let views = self.sim.list();
        if views.is_empty() {
            writeln!(self.output, "No tasks are currently running.")?;
        } else {
            writeln!(
                self.output,
                "{:<5} {:<20} {:<10} {:<10} {:<10} {:<10} {:<15}",
                "ID", "Name", "RAM(MB)", "HDD(MB)", "CPU", "Status", "Running Time"
            )?;
            for view in &views {
                writeln!(
                    self.output,
                    "{:<5} {:<20} {:<10} {:<10} {:<10} {:<10} {} seconds",
                    view.index,
                    view.name,
                    view.quote.ram,
                    view.quote.disk,
                    view.quote.cores,
                    view.status_label(),
                    view.elapsed_secs
                )?;
            }
        }

        if self.mode == PrivilegeMode::User {
            return self.pause();
        }

        writeln!(self.output, "\nKernel Mode Options:")?;
        writeln!(self.output, "1. Close Task")?;
        writeln!(self.output, "2. Minimize Task")?;
        writeln!(self.output, "3. Restore Task")?;
        writeln!(self.output, "4. Show Scheduling Info")?;
        writeln!(self.output, "5. Back to Main Menu")?;
        let Some(choice) = self.prompt_index("\nEnter your choice: ")? else {
            return Ok(());
        };
        match choice {
            1..=3 => {
                let Some(index) = self.prompt_index("Enter Task ID: ")? else {
                    return Ok(());
                };
                let Ok(index) = usize::try_from(index) else {
                    writeln!(self.output, "Invalid Task ID!")?;
                    return Ok(());
                };
                let result = match choice {
                    1 => self.sim.close(index).map(|view| format!("{} closed.", view.name)),
                    2 => self.sim.minimize(index).map(|()| "Task minimized.".to_string()),
                    _ => self.sim.restore(index).map(|()| "Task restored.".to_string()),
                };
                match result {
                    Ok(msg) => writeln!(self.output, "{msg}")?,
                    Err(_) => writeln!(self.output, "Invalid Task ID!")?,
                }
            }
            4 => self.show_scheduling_info()?,
            _ => {}
        }
        Ok(())
    }

    fn show_scheduling_info(&mut self) -> AppResult<()> {
        let info = self.sim.scheduling_info();
        writeln!(self.output, "\n=== CPU Scheduling Information ===")?;
        writeln!(self.output, "Current algorithm: {}", info.policy.description())?;
        if info.policy == SchedulingPolicy::RoundRobin {
            writeln!(self.output, "Time Quantum: {} ticks", info.quantum)?;
        }
        writeln!(self.output, "\nTask Queue:")?;
        writeln!(
            self.output,
            "{:<5} {:<20} {:<10} {:<10} {:<10}",
            "ID", "Name", "Priority", "Rem Time", "Status"
        )?;
        for view in &info.queue {
            write_queue_row(&mut self.output, view)?;
        }
        self.pause()
    }

    fn end_task(&mut self) -> AppResult<()> {
        writeln!(self.output, "=== End Task Immediately ===")?;
        let views = self.sim.list();
        if views.is_empty() {
            writeln!(self.output, "No tasks are currently running.")?;
            return Ok(());
        }
        writeln!(self.output, "Running Tasks:")?;
        for view in &views {
            writeln!(self.output, "{}. {} (handle {})", view.index, view.name, view.handle)?;
        }
        let Some(index) = self.prompt_index("\nEnter task number to end (or -1 to cancel): ")?
        else {
            return Ok(());
        };
        // Negative numbers cancel; out-of-range numbers are ignored.
        if let Ok(index) = usize::try_from(index) {
            if let Ok(view) = self.sim.close(index) {
                writeln!(self.output, "{} closed.", view.name)?;
            }
        }
        Ok(())
    }

    fn set_scheduling(&mut self) -> AppResult<()> {
        writeln!(self.output, "=== CPU Scheduling Algorithm ===")?;
        writeln!(self.output, "Current algorithm: {}", self.sim.policy().description())?;
        writeln!(self.output, "\nSelect new algorithm:")?;
        writeln!(self.output, "1. First-Come-First-Serve (FCFS)")?;
        writeln!(self.output, "2. Round Robin")?;
        writeln!(self.output, "3. Priority Scheduling")?;
        writeln!(self.output, "4. Back to Main Menu")?;
        let Some(choice) = self.prompt_index("\nEnter your choice: ")? else {
            return Ok(());
        };
        let policy = match choice {
            1..=3 => usize::try_from(choice - 1)
                .ok()
                .and_then(|i| SchedulingPolicy::ALL.get(i).copied()),
            4 => return Ok(()),
            _ => None,
        };
        match policy {
            Some(policy) => {
                self.sim.set_policy(policy);
                writeln!(self.output, "Scheduling algorithm changed!")?;
            }
            None => writeln!(self.output, "Invalid choice!")?,
        }
        Ok(())
    }

    fn shutdown(&mut self) -> AppResult<usize> {
        writeln!(self.output, "Shutting down...")?;
        let closed = self.sim.shutdown();
        writeln!(self.output, "{closed} tasks closed. Goodbye.")?;
        self.output.flush()?;
        Ok(closed)
    }
}

fn write_queue_row<O: Write>(out: &mut O, view: &TaskView) -> AppResult<()> {
    writeln!(
        out,
        "{:<5} {:<20} {:<10} {:<10} {:<10}",
        view.index,
        view.name,
        view.priority,
        view.remaining,
        view.status_label()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{QuantumCharge, Scheduler, SessionLimits, TaskSpec, DEFAULT_QUANTUM};
    use crate::runtime::SimulatedRunner;
    use crate::util::serde::ResourceQuote;
    use std::io::Cursor;

    fn sim(total: ResourceQuote) -> Simulator<SimulatedRunner> {
        let limits = SessionLimits::new(total, 50).with_seed(1);
        Simulator::new(limits, Scheduler::default(), SimulatedRunner::new()).unwrap()
    }

    fn run_script(sim: &Simulator<SimulatedRunner>, script: &str) -> (usize, String) {
        let mut console = Console::new(sim, Cursor::new(script.as_bytes().to_vec()), Vec::new());
        let closed = console.run().unwrap();
        (closed, String::from_utf8(console.into_output()).unwrap())
    }

    #[test]
    fn test_menu_numbers() {
        assert_eq!(MenuChoice::from_number(1), Some(MenuChoice::Launch(TaskKind::Notepad)));
        assert_eq!(MenuChoice::from_number(16), Some(MenuChoice::Launch(TaskKind::HelpSystem)));
        assert_eq!(MenuChoice::from_number(17), Some(MenuChoice::ShowTasks));
        assert_eq!(MenuChoice::from_number(21), Some(MenuChoice::SetScheduling));
        assert_eq!(MenuChoice::from_number(0), None);
        assert_eq!(MenuChoice::from_number(22), None);
        assert!(MenuChoice::Launch(TaskKind::Time).ticks_scheduler());
        assert!(!MenuChoice::EndTask.ticks_scheduler());
    }

    #[test]
    fn test_background_launch_then_shutdown() {
        let sim = sim(ResourceQuote::new(1000, 1000, 8));
        let (closed, out) = run_script(&sim, "1\ny\n17\n\n20\n");
        assert_eq!(closed, 1);
        assert!(out.contains("Task started in background!"));
        assert!(out.contains("Notepad"));
        assert!(sim.is_closed());
    }

    #[test]
    fn test_foreground_launch_registers_nothing() {
        let sim = sim(ResourceQuote::new(1000, 1000, 8));
        let (closed, out) = run_script(&sim, "2\nn\n20\n");
        assert_eq!(closed, 0);
        assert!(out.contains("Calculator closed."));
        assert_eq!(sim.runner().foreground_runs(), vec![TaskKind::Calculator]);
    }

    #[test]
    fn test_insufficient_resources_skips_mode_prompt() {
        let sim = sim(ResourceQuote::new(10, 10, 1));
        let (_, out) = run_script(&sim, "10\n20\n");
        assert!(out.contains("Not enough resources to start this task!"));
        assert!(!out.contains("Run in background?"));
    }

    #[test]
    fn test_kernel_mode_close() {
        let sim = sim(ResourceQuote::new(1000, 1000, 8));
        sim.boot(&[TaskKind::Calendar, TaskKind::Time]);
        let (closed, out) = run_script(&sim, "19\n17\n1\n0\n20\n");
        assert!(out.contains("Switched to Kernel mode."));
        assert!(out.contains("Calendar closed."));
        assert_eq!(closed, 1);
    }

    #[test]
    fn test_kernel_mode_rejects_bad_index() {
        let sim = sim(ResourceQuote::new(1000, 1000, 8));
        sim.boot(&[TaskKind::Calendar]);
        let (_, out) = run_script(&sim, "19\n17\n2\n5\n20\n");
        assert!(out.contains("Invalid Task ID!"));
    }

    #[test]
    fn test_set_scheduling() {
        let sim = sim(ResourceQuote::new(1000, 1000, 8));
        run_script(&sim, "21\n2\n20\n");
        assert_eq!(sim.policy(), SchedulingPolicy::RoundRobin);
    }

    #[test]
    fn test_end_task_cancel_and_close() {
        let sim = sim(ResourceQuote::new(1000, 1000, 8));
        sim.boot(&[TaskKind::Calendar, TaskKind::Time]);
        let (closed, out) = run_script(&sim, "18\n-1\n18\n1\n20\n");
        assert!(out.contains("Time closed."));
        assert_eq!(closed, 1);
    }

    #[test]
    fn test_invalid_choice_ticks_scheduler() {
        let limits = SessionLimits::new(ResourceQuote::new(1000, 1000, 8), 50).with_seed(1);
        let scheduler =
            Scheduler::new(SchedulingPolicy::RoundRobin, DEFAULT_QUANTUM, QuantumCharge::Incoming);
        let sim = Simulator::new(limits, scheduler, SimulatedRunner::new()).unwrap();
        let handle = sim.runner().spawn(TaskKind::Calendar).unwrap();
        sim.create(TaskSpec::for_kind(TaskKind::Calendar, 3, 1, handle)).unwrap();

        let (closed, out) = run_script(&sim, "99\nabc\n");
        assert_eq!(closed, 0);
        assert!(out.contains("Calendar finished its burst and was closed."));
        let evicted_at = out.find("finished its burst").unwrap();
        assert!(evicted_at < out.rfind("Invalid choice!").unwrap());
    }

    #[test]
    fn test_show_tasks_does_not_tick() {
        let limits = SessionLimits::new(ResourceQuote::new(1000, 1000, 8), 50).with_seed(1);
        let scheduler =
            Scheduler::new(SchedulingPolicy::RoundRobin, DEFAULT_QUANTUM, QuantumCharge::Incoming);
        let sim = Simulator::new(limits, scheduler, SimulatedRunner::new()).unwrap();
        let handle = sim.runner().spawn(TaskKind::Calendar).unwrap();
        sim.create(TaskSpec::for_kind(TaskKind::Calendar, 3, 1, handle)).unwrap();

        let (closed, out) = run_script(&sim, "17\n\n20\n");
        assert_eq!(closed, 1);
        assert!(!out.contains("finished its burst"));
    }

    #[test]
    fn test_invalid_choice_and_eof() {
        let sim = sim(ResourceQuote::new(1000, 1000, 8));
        let (_, out) = run_script(&sim, "99\nabc\n");
        assert_eq!(out.matches("Invalid choice!").count(), 2);
        assert!(out.contains("Shutting down..."));
        assert!(sim.is_closed());
    }
}

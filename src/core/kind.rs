//! Task kinds and their static resource quotes.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::serde::ResourceQuote;

/// The applications an operator can launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Text editor.
    Notepad,
    /// Arithmetic calculator.
    Calculator,
    /// Clock display.
    Time,
    /// Month calendar.
    Calendar,
    /// Create a file.
    CreateFile,
    /// Move a file.
    MoveFile,
    /// Copy a file.
    CopyFile,
    /// Delete a file.
    DeleteFile,
    /// Show file metadata.
    FileInfo,
    /// Minesweeper game.
    Minesweeper,
    /// Music player.
    MusicPlayer,
    /// Resource usage monitor.
    SystemMonitor,
    /// Process listing.
    ProcessManager,
    /// Memory allocation map.
    MemoryViewer,
    /// Snake game.
    SnakeGame,
    /// Help pages.
    HelpSystem,
}

impl TaskKind {
    /// Every kind, in menu order.
    pub const ALL: [Self; 16] = [
        Self::Notepad,
        Self::Calculator,
        Self::Time,
        Self::Calendar,
        Self::CreateFile,
        Self::MoveFile,
        Self::CopyFile,
        Self::DeleteFile,
        Self::FileInfo,
        Self::Minesweeper,
        Self::MusicPlayer,
        Self::SystemMonitor,
        Self::ProcessManager,
        Self::MemoryViewer,
        Self::SnakeGame,
        Self::HelpSystem,
    ];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Notepad => "Notepad",
            Self::Calculator => "Calculator",
            Self::Time => "Time",
            Self::Calendar => "Calendar",
            Self::CreateFile => "Create File",
            Self::MoveFile => "Move File",
            Self::CopyFile => "Copy File",
            Self::DeleteFile => "Delete File",
            Self::FileInfo => "File Info",
            Self::Minesweeper => "Minesweeper",
            Self::MusicPlayer => "Music Player",
            Self::SystemMonitor => "System Monitor",
            Self::ProcessManager => "Process Manager",
            Self::MemoryViewer => "Memory Viewer",
            Self::SnakeGame => "Snake Game",
            Self::HelpSystem => "Help System",
        }
    }

    /// Identifier used in config files, thread names and on the command line.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Notepad => "notepad",
            Self::Calculator => "calculator",
            Self::Time => "time",
            Self::Calendar => "calendar",
            Self::CreateFile => "create_file",
            Self::MoveFile => "move_file",
            Self::CopyFile => "copy_file",
            Self::DeleteFile => "delete_file",
            Self::FileInfo => "file_info",
            Self::Minesweeper => "minesweeper",
            Self::MusicPlayer => "music_player",
            Self::SystemMonitor => "system_monitor",
            Self::ProcessManager => "process_manager",
            Self::MemoryViewer => "memory_viewer",
            Self::SnakeGame => "snake_game",
            Self::HelpSystem => "help_system",
        }
    }

    /// RAM (MB), disk (MB) and cores reserved while the task runs in the background.
    #[must_use]
    pub const fn quote(self) -> ResourceQuote {
        match self {
            Self::Notepad => ResourceQuote::new(50, 5, 1),
            Self::Calculator => ResourceQuote::new(20, 1, 1),
            Self::Time => ResourceQuote::new(10, 1, 1),
            Self::Calendar => ResourceQuote::new(15, 2, 1),
            Self::CreateFile => ResourceQuote::new(30, 10, 1),
            Self::MoveFile | Self::CopyFile => ResourceQuote::new(40, 10, 1),
            Self::DeleteFile => ResourceQuote::new(30, 1, 1),
            Self::FileInfo => ResourceQuote::new(25, 1, 1),
            Self::Minesweeper => ResourceQuote::new(60, 10, 2),
            Self::MusicPlayer => ResourceQuote::new(40, 20, 1),
            Self::SystemMonitor => ResourceQuote::new(50, 5, 2),
            Self::ProcessManager => ResourceQuote::new(45, 5, 2),
            Self::MemoryViewer => ResourceQuote::new(35, 5, 1),
            Self::SnakeGame => ResourceQuote::new(55, 10, 2),
            Self::HelpSystem => ResourceQuote::new(30, 5, 1),
        }
    }

    /// Wake-up interval of the background worker, or `None` when the worker
    /// has nothing to do and exits as soon as it starts.
    #[must_use]
    pub const fn idle_interval(self) -> Option<Duration> {
        match self {
            Self::Calendar => Some(Duration::from_secs(60)),
            Self::Time => Some(Duration::from_secs(1)),
            _ => None,
        }
    }

    /// Kind for a 1-based menu choice.
    #[must_use]
    pub fn from_menu(choice: usize) -> Option<Self> {
        choice.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == wanted)
            .ok_or_else(|| format!("unknown task kind `{s}`"))
    }
}

/// How a launch request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecMode {
    /// Synchronous routine; no registry slot, no accounting.
    Foreground,
    /// Backing worker plus a registry entry holding the kind's quote.
    Background,
}

//! Serializable identifiers and resource types shared across the crate.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Unique, monotonically assigned task identifier.
pub type TaskId = u64;

/// Opaque token a task runner hands out for the unit of work it started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskHandle(pub u64);

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The resource dimensions tracked by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Main memory, in MB.
    Ram,
    /// Hard drive space, in MB.
    Disk,
    /// CPU cores.
    Cores,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ram => write!(f, "RAM"),
            Self::Disk => write!(f, "disk"),
            Self::Cores => write!(f, "CPU cores"),
        }
    }
}

/// An amount of each resource dimension: a task's quote, or a ledger counter set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceQuote {
    /// RAM units (MB).
    pub ram: u32,
    /// Disk units (MB).
    pub disk: u32,
    /// CPU-core units.
    pub cores: u32,
}

impl ResourceQuote {
    /// Build a quote from its three components.
    #[must_use]
    pub const fn new(ram: u32, disk: u32, cores: u32) -> Self {
        Self { ram, disk, cores }
    }

    /// True when every dimension of `self` fits inside `other`.
    #[must_use]
    pub const fn fits_within(&self, other: &Self) -> bool {
        self.ram <= other.ram && self.disk <= other.disk && self.cores <= other.cores
    }

    /// First dimension in which `self` exceeds `other`, if any.
    #[must_use]
    pub const fn first_shortfall(&self, other: &Self) -> Option<ResourceKind> {
        if self.ram > other.ram {
            Some(ResourceKind::Ram)
        } else if self.disk > other.disk {
            Some(ResourceKind::Disk)
        } else if self.cores > other.cores {
            Some(ResourceKind::Cores)
        } else {
            None
        }
    }

    /// Value of a single dimension.
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Ram => self.ram,
            ResourceKind::Disk => self.disk,
            ResourceKind::Cores => self.cores,
        }
    }

    /// Component-wise saturating subtraction.
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self {
            ram: self.ram.saturating_sub(rhs.ram),
            disk: self.disk.saturating_sub(rhs.disk),
            cores: self.cores.saturating_sub(rhs.cores),
        }
    }

    /// Component-wise saturating addition.
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self {
            ram: self.ram.saturating_add(rhs.ram),
            disk: self.disk.saturating_add(rhs.disk),
            cores: self.cores.saturating_add(rhs.cores),
        }
    }

    /// Component-wise minimum.
    #[must_use]
    pub fn min(self, rhs: Self) -> Self {
        Self {
            ram: self.ram.min(rhs.ram),
            disk: self.disk.min(rhs.disk),
            cores: self.cores.min(rhs.cores),
        }
    }
}

impl Add for ResourceQuote {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl Sub for ResourceQuote {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl fmt::Display for ResourceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MB RAM, {} MB disk, {} cores", self.ram, self.disk, self.cores)
    }
}

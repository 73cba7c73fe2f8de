//! Fixed-capacity ordered collection of live tasks.
//!
//! Position 0 is the head: the next task to consider under FCFS and Round Robin.
//! Removal compacts the sequence, so indices are only stable between mutations.

use crate::core::{SimError, Task};

/// Ordered task table with a hard upper bound on its length.
#[derive(Debug)]
pub struct TaskRegistry {
    max_tasks: usize,
    tasks: Vec<Task>,
}

impl TaskRegistry {
    /// Create an empty registry holding at most `max_tasks` tasks.
    #[must_use]
    pub fn new(max_tasks: usize) -> Self {
        Self {
            max_tasks,
            tasks: Vec::with_capacity(max_tasks.min(1024)),
        }
    }

    /// Maximum number of tasks.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.max_tasks
    }

    /// Current number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when no task is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// True when another push would exceed capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.tasks.len() >= self.max_tasks
    }

    /// Append at the tail.
    ///
    /// # Errors
    ///
    /// [`SimError::CapacityExceeded`] when the registry is full.
    pub fn push(&mut self, task: Task) -> Result<(), SimError> {
        if self.is_full() {
            return Err(SimError::CapacityExceeded { max: self.max_tasks });
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Task at `index` if it exists and is running.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidIndex`] otherwise.
    pub fn get(&self, index: usize) -> Result<&Task, SimError> {
        self.tasks
            .get(index)
            .filter(|t| t.running)
            .ok_or(SimError::InvalidIndex(index))
    }

    /// Mutable task at `index` if it exists and is running.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidIndex`] otherwise.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut Task, SimError> {
        self.tasks
            .get_mut(index)
            .filter(|t| t.running)
            .ok_or(SimError::InvalidIndex(index))
    }

    /// Remove the task at `index`, shifting later entries left by one.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidIndex`] if out of range or not running.
    pub fn remove(&mut self, index: usize) -> Result<Task, SimError> {
        self.get(index)?;
        Ok(self.tasks.remove(index))
    }

    /// Move the head task to the tail.
    pub fn rotate_left(&mut self) {
        if !self.tasks.is_empty() {
            self.tasks.rotate_left(1);
        }
    }

    /// Stable sort, highest priority first; ties keep their relative order.
    pub fn sort_by_priority(&mut self) {
        self.tasks.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Tasks in scheduling order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Remove every task, head first.
    pub fn drain_all(&mut self) -> Vec<Task> {
        self.tasks.drain(..).collect()
    }
}

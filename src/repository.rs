//! The task repository: owner of the in-memory collection.
//!
//! Every mutation rewrites the whole backing store. Reads hand out copies, so
//! a task obtained from [`TaskRepository::get`] or [`TaskRepository::all`]
//! can only change stored state through another repository call.
//!
//! Lookups by id take the first match. Ids are not checked for uniqueness on
//! add or load; duplicates are reported as a warning when loading.

use std::collections::HashSet;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::classify::TaskType;
use crate::codec;
use crate::error::Result;
use crate::storage::Storage;
use crate::task::{local_now, Task};

#[derive(Debug)]
pub struct TaskRepository {
    tasks: Vec<Task>,
    storage: Storage,
}

impl TaskRepository {
    /// Open a repository over `storage`, loading whatever it holds.
    pub fn open(storage: Storage) -> Result<Self> {
        let mut repo = Self {
            tasks: Vec::new(),
            storage,
        };
        repo.reload()?;
        Ok(repo)
    }

    /// Discard in-memory state and load the backing store again.
    pub fn reload(&mut self) -> Result<()> {
        let tasks = match self.storage.read_tasks_text()? {
            Some(text) => {
                let report = codec::decode_report(&text);
                if !report.skipped.is_empty() {
                    tracing::warn!(
                        skipped = report.skipped.len(),
                        "some task records could not be loaded"
                    );
                }
                report.tasks
            }
            None => Vec::new(),
        };
        warn_on_duplicate_ids(&tasks);
        tracing::info!(count = tasks.len(), "loaded tasks");
        self.tasks = tasks;
        Ok(())
    }

    /// Rewrite the backing store with the full collection.
    pub fn save(&mut self) -> Result<()> {
        let text = codec::encode(&self.tasks);
        if self.storage.write_tasks_text(&text)? {
            tracing::info!(count = self.tasks.len(), "saved tasks");
        }
        Ok(())
    }

    /// Location of the backing store
    pub fn storage_path(&self) -> &Path {
        self.storage.tasks_file()
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    // =========================================================================
    // Mutations (each persists)
    // =========================================================================

    /// Append a task and persist.
    pub fn add(&mut self, task: Task) -> Result<()> {
        tracing::debug!(id = task.id(), name = task.name(), "adding task");
        self.tasks.push(task);
        self.save()
    }

    /// Remove the first task with `id`. Persists only when something was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.position(id) else {
            tracing::debug!(id, "delete: no such task");
            return Ok(false);
        };
        self.tasks.remove(index);
        self.save()?;
        Ok(true)
    }

    /// Apply `mutator` to the first task with `id` and persist.
    ///
    /// Returns `Ok(false)` without persisting when the id is unknown or the
    /// mutator declines by returning `false`.
    pub fn update<F>(&mut self, id: &str, mutator: F) -> Result<bool>
    where
        F: FnOnce(&mut Task) -> bool,
    {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        if !mutator(&mut self.tasks[index]) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Mark a task completed, stamping the current time.
    pub fn complete(&mut self, id: &str) -> Result<bool> {
        self.set_completed(id, true)
    }

    /// Set or clear the completion flag. Clearing keeps the last stamp.
    pub fn set_completed(&mut self, id: &str, completed: bool) -> Result<bool> {
        self.update(id, |task| {
            task.set_completed(completed);
            true
        })
    }

    /// Replace the notes of a task whose type takes notes.
    pub fn update_notes(&mut self, id: &str, notes: &str) -> Result<bool> {
        self.update(id, |task| {
            if !task.can_have_notes() {
                tracing::debug!(id = task.id(), task_type = %task.task_type(), "notes not allowed");
                return false;
            }
            task.set_notes(notes);
            true
        })
    }

    /// Evict completed, non-repeating tasks completed more than `days_old` days ago.
    ///
    /// Returns the number of evicted tasks; persists only when it is non-zero.
    pub fn cleanup(&mut self, days_old: u32) -> Result<usize> {
        self.cleanup_at(days_old, local_now())
    }

    /// Same as [`TaskRepository::cleanup`] with an explicit clock.
    pub fn cleanup_at(&mut self, days_old: u32, now: NaiveDateTime) -> Result<usize> {
        let cutoff = now
            .checked_sub_signed(Duration::days(i64::from(days_old)))
            .unwrap_or(NaiveDateTime::MIN);
        let before = self.tasks.len();
        self.tasks.retain(|task| !is_expired(task, cutoff));
        let removed = before - self.tasks.len();
        if removed > 0 {
            tracing::info!(removed, days_old, "cleaned up completed tasks");
            self.save()?;
        }
        Ok(removed)
    }

    // =========================================================================
    // Queries (copies)
    // =========================================================================

    /// First task with `id`
    pub fn get(&self, id: &str) -> Option<Task> {
        self.tasks.iter().find(|task| task.id() == id).cloned()
    }

    /// Every task, in insertion order
    pub fn all(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Tasks due on exactly `date`
    pub fn for_date(&self, date: NaiveDate) -> Vec<Task> {
        self.filtered(|task| task.deadline() == date)
    }

    pub fn by_type(&self, task_type: TaskType) -> Vec<Task> {
        self.filtered(|task| task.task_type() == task_type)
    }

    /// Tasks not yet completed
    pub fn active(&self) -> Vec<Task> {
        self.filtered(|task| !task.is_completed())
    }

    /// Tasks ordered by priority rank, then deadline, then name. Stable.
    pub fn sorted(&self) -> Vec<Task> {
        let mut tasks = self.all();
        sort_tasks(&mut tasks);
        tasks
    }

    fn filtered<P>(&self, predicate: P) -> Vec<Task>
    where
        P: Fn(&Task) -> bool,
    {
        self.tasks
            .iter()
            .filter(|task| predicate(task))
            .cloned()
            .collect()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id() == id)
    }
}

/// Stable sort by (priority rank, deadline, name).
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|left, right| {
        left.priority()
            .rank()
            .cmp(&right.priority().rank())
            .then_with(|| left.deadline().cmp(&right.deadline()))
            .then_with(|| left.name().cmp(right.name()))
    });
}

fn is_expired(task: &Task, cutoff: NaiveDateTime) -> bool {
    task.is_completed()
        && !task.is_repeating()
        && task.completed_at().is_some_and(|at| at < cutoff)
}

fn warn_on_duplicate_ids(tasks: &[Task]) {
    let mut seen = HashSet::new();
    for task in tasks {
        if !seen.insert(task.id()) {
            tracing::warn!(id = task.id(), "duplicate task id; lookups use the first");
        }
    }
}

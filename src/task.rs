//! The task entity.
//!
//! Timestamps are local wall-clock times without a zone, which is what the
//! backing store has always held.

use chrono::{Local, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::classify::{Priority, Repetition, TaskType};

/// Current local time, the clock used for completion stamps and cleanup.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: String,
    name: String,
    deadline: NaiveDate,
    task_type: TaskType,
    priority: Priority,
    repetition: Repetition,
    notes: String,
    completed: bool,
    completed_at: Option<NaiveDateTime>,
}

impl Task {
    /// Create a task with a fresh identity, empty notes and not completed.
    pub fn new(
        name: impl Into<String>,
        deadline: NaiveDate,
        task_type: TaskType,
        priority: Priority,
        repetition: Repetition,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            deadline,
            task_type,
            priority,
            repetition,
            notes: String::new(),
            completed: false,
            completed_at: None,
        }
    }

    /// Replace the generated identity with a persisted one.
    pub(crate) fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Restore completion state exactly as persisted, without touching the clock.
    pub(crate) fn restore_completion(
        &mut self,
        completed: bool,
        completed_at: Option<NaiveDateTime>,
    ) {
        self.completed = completed;
        self.completed_at = completed_at;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn deadline(&self) -> NaiveDate {
        self.deadline
    }

    pub fn set_deadline(&mut self, deadline: NaiveDate) {
        self.deadline = deadline;
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn set_task_type(&mut self, task_type: TaskType) {
        self.task_type = task_type;
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    pub fn set_repetition(&mut self, repetition: Repetition) {
        self.repetition = repetition;
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// When the task was last marked completed. Un-completing keeps the
    /// previous stamp.
    pub fn completed_at(&self) -> Option<NaiveDateTime> {
        self.completed_at
    }

    /// Set the completion flag, stamping the current time when set to true.
    pub fn set_completed(&mut self, completed: bool) {
        self.set_completed_at(completed, local_now());
    }

    /// Same as [`Task::set_completed`] with an explicit clock. The stamp only
    /// moves on a transition from not completed to completed.
    pub fn set_completed_at(&mut self, completed: bool, now: NaiveDateTime) {
        if completed && !self.completed {
            self.completed_at = Some(now);
        }
        self.completed = completed;
    }

    /// Only tests carry meaningful notes.
    pub fn can_have_notes(&self) -> bool {
        self.task_type == TaskType::Test
    }

    pub fn is_repeating(&self) -> bool {
        self.repetition != Repetition::None
    }
}

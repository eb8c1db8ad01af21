//! Command surface used by presentation layers.
//!
//! Inputs arrive as raw strings; enum literals and dates are parsed here and
//! rejected before any task is built. Results are [`TaskView`]s, which use
//! the field names the front end expects (`dueDate`, `taskType`) rather than
//! the backing-store names.
//!
//! Every handler takes the repository explicitly.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::classify::{Priority, Repetition, TaskType};
use crate::error::{Error, Result};
use crate::repository::TaskRepository;
use crate::task::Task;

/// Request to create a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: String,
    pub task_type: String,
    pub priority: String,
    pub deadline: String,
    pub repetition: String,
    pub notes: Option<String>,
}

/// Presentation representation of a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: String,
    pub name: String,
    pub due_date: NaiveDate,
    pub task_type: TaskType,
    pub label: &'static str,
    pub color: &'static str,
    pub priority: Priority,
    pub repetition: Repetition,
    pub notes: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<NaiveDateTime>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().to_string(),
            name: task.name().to_string(),
            due_date: task.deadline(),
            task_type: task.task_type(),
            label: task.task_type().label(),
            color: task.task_type().color(),
            priority: task.priority(),
            repetition: task.repetition(),
            notes: task.notes().to_string(),
            completed: task.is_completed(),
            completed_at: task.completed_at(),
        }
    }
}

fn views(tasks: &[Task]) -> Vec<TaskView> {
    tasks.iter().map(TaskView::from).collect()
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidDate(raw.to_string()))
}

/// Build a task from a request without touching the repository.
pub fn build_task(request: &NewTask) -> Result<Task> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidArgument("task name cannot be empty".to_string()));
    }
    let task_type: TaskType = request.task_type.parse()?;
    let priority: Priority = request.priority.parse()?;
    let repetition: Repetition = request.repetition.parse()?;
    let deadline = parse_date(&request.deadline)?;

    let mut task = Task::new(name, deadline, task_type, priority, repetition);
    if let Some(notes) = request.notes.as_deref().filter(|notes| !notes.is_empty()) {
        task.set_notes(notes);
    }
    Ok(task)
}

/// Create and persist a task, returning its id.
pub fn add_task(repo: &mut TaskRepository, request: &NewTask) -> Result<String> {
    let task = build_task(request)?;
    let id = task.id().to_string();
    repo.add(task)?;
    tracing::info!(%id, name = request.name.trim(), "task added");
    Ok(id)
}

pub fn get_all_tasks(repo: &TaskRepository) -> Vec<TaskView> {
    views(&repo.all())
}

pub fn get_task(repo: &TaskRepository, id: &str) -> Option<TaskView> {
    repo.get(id).as_ref().map(TaskView::from)
}

/// Tasks due on `date` (`YYYY-MM-DD`).
///
/// An unparseable date is an [`Error::InvalidDate`], not an empty list, so a
/// typo is never mistaken for a free day.
pub fn get_tasks_for_date(repo: &TaskRepository, date: &str) -> Result<Vec<TaskView>> {
    let date = parse_date(date)?;
    Ok(views(&repo.for_date(date)))
}

pub fn delete_task(repo: &mut TaskRepository, id: &str) -> Result<bool> {
    let removed = repo.delete(id)?;
    tracing::debug!(id, removed, "delete task");
    Ok(removed)
}

/// `false` when the id is unknown
pub fn complete_task(repo: &mut TaskRepository, id: &str) -> Result<bool> {
    repo.complete(id)
}

/// `false` when the id is unknown or the task's type does not take notes
pub fn update_notes(repo: &mut TaskRepository, id: &str, notes: &str) -> Result<bool> {
    repo.update_notes(id, notes)
}

//! prowork task command implementations.

use std::path::PathBuf;

use crate::classify::TaskType;
use crate::commands::{self, NewTask, TaskView};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::repository::{sort_tasks, TaskRepository};
use crate::storage::{self, Storage};

/// Everything a command needs: the repository, settings and output mode.
pub struct Context {
    pub repo: TaskRepository,
    pub config: Config,
    pub output: OutputOptions,
}

impl Context {
    pub fn open(home: Option<PathBuf>, json: bool, quiet: bool) -> Result<Self> {
        let app_dir = home.unwrap_or_else(storage::default_app_dir);
        let config = Config::load_from_dir(&app_dir);
        let storage = Storage::open(app_dir, &config.tasks_file);
        let mut repo = TaskRepository::open(storage)?;

        if config.cleanup.on_startup {
            let removed = repo.cleanup(config.cleanup.days)?;
            tracing::debug!(removed, "startup cleanup");
        }

        Ok(Self {
            repo,
            config,
            output: OutputOptions { json, quiet },
        })
    }
}

pub struct AddOptions {
    pub name: String,
    pub due: String,
    pub task_type: String,
    pub priority: String,
    pub repetition: String,
    pub notes: Option<String>,
}

pub struct ListOptions {
    pub date: Option<String>,
    pub task_type: Option<String>,
    pub sorted: bool,
    pub active: bool,
}

#[derive(serde::Serialize)]
struct AddReport {
    id: String,
    task: Option<TaskView>,
}

#[derive(serde::Serialize)]
struct ListReport {
    total: usize,
    tasks: Vec<TaskView>,
}

#[derive(serde::Serialize)]
struct TaskChangeReport<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<TaskView>,
}

#[derive(serde::Serialize)]
struct CleanupReport {
    days: u32,
    removed: usize,
    remaining: usize,
}

#[derive(serde::Serialize)]
struct PathReport {
    path: PathBuf,
    persistent: bool,
}

pub fn run_add(ctx: &mut Context, options: AddOptions) -> Result<()> {
    let request = NewTask {
        name: options.name,
        task_type: options.task_type,
        priority: options.priority,
        deadline: options.due,
        repetition: options.repetition,
        notes: options.notes,
    };
    let id = commands::add_task(&mut ctx.repo, &request)?;
    let task = commands::get_task(&ctx.repo, &id);

    let mut human = HumanOutput::new("Task added");
    human.push_summary("ID", id.clone());
    if let Some(view) = task.as_ref() {
        push_task_summary(&mut human, view);
    }
    push_storage_warning(&mut human, &ctx.repo);
    human.push_next_step(format!("prowork complete {id}"));

    emit_success(ctx.output, "add", &AddReport { id, task }, Some(&human))
}

pub fn run_list(ctx: &Context, options: ListOptions) -> Result<()> {
    let mut tasks = match (options.date.as_deref(), options.task_type.as_deref()) {
        (Some(date), _) => ctx.repo.for_date(commands::parse_date(date)?),
        (None, Some(raw)) => ctx.repo.by_type(raw.parse::<TaskType>()?),
        (None, None) if options.active => ctx.repo.active(),
        (None, None) => ctx.repo.all(),
    };
    if options.active {
        tasks.retain(|task| !task.is_completed());
    }
    if options.sorted {
        sort_tasks(&mut tasks);
    }

    let views: Vec<TaskView> = tasks.iter().map(TaskView::from).collect();

    let header = match views.len() {
        0 => "No tasks".to_string(),
        1 => "1 task".to_string(),
        n => format!("{n} tasks"),
    };
    let mut human = HumanOutput::new(header);
    for view in &views {
        human.push_detail(format_row(view));
    }
    if views.is_empty() {
        human.push_next_step("prowork add <name> --due YYYY-MM-DD");
    }

    let report = ListReport {
        total: views.len(),
        tasks: views,
    };
    emit_success(ctx.output, "list", &report, Some(&human))
}

pub fn run_show(ctx: &Context, id: &str) -> Result<()> {
    let view = commands::get_task(&ctx.repo, id).ok_or_else(|| Error::TaskNotFound(id.to_string()))?;

    let mut human = HumanOutput::new(view.name.clone());
    human.push_summary("ID", view.id.clone());
    push_task_summary(&mut human, &view);
    if !view.notes.is_empty() {
        for line in view.notes.lines() {
            human.push_detail(line.to_string());
        }
    }

    emit_success(ctx.output, "show", &view, Some(&human))
}

pub fn run_delete(ctx: &mut Context, id: &str) -> Result<()> {
    if !commands::delete_task(&mut ctx.repo, id)? {
        return Err(Error::TaskNotFound(id.to_string()));
    }

    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", id);
    push_storage_warning(&mut human, &ctx.repo);

    emit_success(
        ctx.output,
        "delete",
        &TaskChangeReport { id, task: None },
        Some(&human),
    )
}

pub fn run_complete(ctx: &mut Context, id: &str) -> Result<()> {
    if !commands::complete_task(&mut ctx.repo, id)? {
        return Err(Error::TaskNotFound(id.to_string()));
    }
    let task = commands::get_task(&ctx.repo, id);

    let mut human = HumanOutput::new("Task completed");
    human.push_summary("ID", id);
    if let Some(at) = task.as_ref().and_then(|view| view.completed_at) {
        human.push_summary("Completed at", at.format("%Y-%m-%d %H:%M").to_string());
    }
    push_storage_warning(&mut human, &ctx.repo);

    emit_success(
        ctx.output,
        "complete",
        &TaskChangeReport { id, task },
        Some(&human),
    )
}

pub fn run_notes(ctx: &mut Context, id: &str, text: &str) -> Result<()> {
    let current = ctx
        .repo
        .get(id)
        .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
    if !current.can_have_notes() {
        return Err(Error::NotesNotAllowed {
            id: id.to_string(),
            task_type: current.task_type().to_string(),
        });
    }
    if !commands::update_notes(&mut ctx.repo, id, text)? {
        return Err(Error::OperationFailed(format!("notes for {id} were not updated")));
    }
    let task = commands::get_task(&ctx.repo, id);

    let mut human = HumanOutput::new("Notes updated");
    human.push_summary("ID", id);
    push_storage_warning(&mut human, &ctx.repo);

    emit_success(
        ctx.output,
        "notes",
        &TaskChangeReport { id, task },
        Some(&human),
    )
}

pub fn run_cleanup(ctx: &mut Context, days: Option<u32>) -> Result<()> {
    let days = days.unwrap_or(ctx.config.cleanup.days);
    let removed = ctx.repo.cleanup(days)?;

    let mut human = HumanOutput::new(match removed {
        0 => "Nothing to clean up".to_string(),
        1 => "Removed 1 completed task".to_string(),
        n => format!("Removed {n} completed tasks"),
    });
    human.push_summary("Older than", format!("{days} days"));
    human.push_summary("Remaining", ctx.repo.len().to_string());
    push_storage_warning(&mut human, &ctx.repo);

    let report = CleanupReport {
        days,
        removed,
        remaining: ctx.repo.len(),
    };
    emit_success(ctx.output, "cleanup", &report, Some(&human))
}

pub fn run_path(ctx: &Context) -> Result<()> {
    let path = ctx.repo.storage_path().to_path_buf();
    let report = PathReport {
        path: path.clone(),
        persistent: ctx.repo.storage().is_persistent(),
    };

    let mut human = HumanOutput::new(path.display().to_string());
    push_storage_warning(&mut human, &ctx.repo);

    emit_success(ctx.output, "path", &report, Some(&human))
}

fn push_task_summary(human: &mut HumanOutput, view: &TaskView) {
    human.push_summary("Due", view.due_date.to_string());
    human.push_summary("Type", view.label);
    human.push_summary("Priority", view.priority.label());
    human.push_summary("Repeats", view.repetition.label());
    human.push_summary("Completed", if view.completed { "yes" } else { "no" });
}

fn push_storage_warning(human: &mut HumanOutput, repo: &TaskRepository) {
    if !repo.storage().is_persistent() {
        human.push_warning(format!(
            "cannot write {}; changes are kept in memory only",
            repo.storage_path().display()
        ));
    }
}

fn format_row(view: &TaskView) -> String {
    format!(
        "[{}] {} {:<8} {:<8} {} ({})",
        if view.completed { "x" } else { " " },
        view.due_date,
        view.priority.label(),
        view.label,
        view.name,
        view.id
    )
}

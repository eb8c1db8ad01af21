//! Command-line interface for prowork
//!
//! This module defines the CLI structure using clap derive macros.
//! Task subcommands are implemented in `task`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

mod task;

/// prowork - personal task tracking
///
/// Keeps tests, homework, meetings, trainings and work items in a single
/// JSON file under ~/.prowork.
#[derive(Parser, Debug)]
#[command(name = "prowork")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Application directory (defaults to ~/.prowork)
    #[arg(long, global = true, env = "PROWORK_HOME")]
    pub home: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a task
    Add {
        /// Task name
        name: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: String,

        /// Task type: TEST, HOMEWORK, MEETING, TRAINING, WORK
        #[arg(long = "type", default_value = "WORK")]
        task_type: String,

        /// Priority: HIGH, MEDIUM, LOW, NOT_USED
        #[arg(long, default_value = "MEDIUM")]
        priority: String,

        /// Repetition: NONE, DAILY, WEEKLY, MONTHLY, YEARLY
        #[arg(long = "repeat", default_value = "NONE")]
        repetition: String,

        /// Notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List tasks
    List {
        /// Only tasks due on this date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "task_type")]
        date: Option<String>,

        /// Only tasks of this type
        #[arg(long = "type")]
        task_type: Option<String>,

        /// Order by priority, due date, then name
        #[arg(long)]
        sorted: bool,

        /// Only tasks not yet completed
        #[arg(long)]
        active: bool,
    },

    /// Show a single task
    Show {
        /// Task ID
        id: String,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },

    /// Mark a task completed
    Complete {
        /// Task ID
        id: String,
    },

    /// Replace the notes of a TEST task
    Notes {
        /// Task ID
        id: String,

        /// New notes text
        text: String,
    },

    /// Remove completed, non-repeating tasks older than a number of days
    Cleanup {
        /// Age threshold in days (defaults to the configured value)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Print where tasks are stored
    Path,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let mut ctx = task::Context::open(self.home, self.json, self.quiet)?;
        match self.command {
            Commands::Add {
                name,
                due,
                task_type,
                priority,
                repetition,
                notes,
            } => task::run_add(
                &mut ctx,
                task::AddOptions {
                    name,
                    due,
                    task_type,
                    priority,
                    repetition,
                    notes,
                },
            ),
            Commands::List {
                date,
                task_type,
                sorted,
                active,
            } => task::run_list(
                &ctx,
                task::ListOptions {
                    date,
                    task_type,
                    sorted,
                    active,
                },
            ),
            Commands::Show { id } => task::run_show(&ctx, &id),
            Commands::Delete { id } => task::run_delete(&mut ctx, &id),
            Commands::Complete { id } => task::run_complete(&mut ctx, &id),
            Commands::Notes { id, text } => task::run_notes(&mut ctx, &id, &text),
            Commands::Cleanup { days } => task::run_cleanup(&mut ctx, days),
            Commands::Path => task::run_path(&ctx),
        }
    }
}

//! prowork - personal task tracking library
//!
//! This library provides the core of the prowork CLI: a task model, a
//! small JSON codec for the backing file, and a repository that keeps the
//! in-memory collection and the file in step.
//!
//! # Core Concepts
//!
//! - **Task**: a named item with a due date, type, priority and repetition
//! - **Classifiers**: the closed sets of task types, priorities and repetitions
//! - **Repository**: owns the collection, rewrites the file after each change
//! - **Cleanup**: evicts completed, non-repeating tasks after a number of days
//!
//! # Module Organization
//!
//! - `classify`: `TaskType`, `Priority` and `Repetition`
//! - `task`: the `Task` entity and its completion rules
//! - `codec`: encoding and lenient decoding of the task file
//! - `storage`: application directory, file paths and atomic writes
//! - `repository`: CRUD, queries, sorting and cleanup
//! - `commands`: string-typed command surface returning `TaskView`s
//! - `worker`: a thread that owns the repository and serializes requests
//! - `config`: `config.toml` loading
//! - `output`: human and JSON output for the CLI
//! - `cli`: command-line interface using clap

pub mod classify;
pub mod cli;
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod repository;
pub mod storage;
pub mod task;
pub mod worker;

pub use error::{Error, Result};

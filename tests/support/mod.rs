#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use chrono::NaiveDate;
use prowork::classify::{Priority, Repetition, TaskType};
use prowork::repository::TaskRepository;
use prowork::storage::{Storage, TASKS_FILE};
use prowork::task::Task;
use tempfile::TempDir;

/// Throwaway application directory
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.dir.path().join(TASKS_FILE)
    }

    pub fn write_tasks(&self, contents: &str) -> PathBuf {
        let path = self.tasks_file();
        fs::write(&path, contents).expect("write tasks file");
        path
    }

    pub fn read_tasks(&self) -> String {
        fs::read_to_string(self.tasks_file()).expect("read tasks file")
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join("config.toml");
        fs::write(&path, contents).expect("write config");
        path
    }

    pub fn open_repo(&self) -> TaskRepository {
        TaskRepository::open(Storage::open(self.path(), TASKS_FILE)).expect("open repository")
    }
}

pub fn prowork_cmd(home: &TestHome) -> Command {
    let mut cmd = Command::cargo_bin("prowork").expect("binary");
    cmd.env("PROWORK_HOME", home.path());
    cmd.env_remove("RUST_LOG");
    cmd
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn task(name: &str, deadline: NaiveDate, priority: Priority) -> Task {
    Task::new(name, deadline, TaskType::Work, priority, Repetition::None)
}

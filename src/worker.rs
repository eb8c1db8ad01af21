//! Dedicated thread that owns the repository.
//!
//! Front ends that must not block on disk talk to the repository through a
//! [`WorkerHandle`]. Requests are queued on a channel and handled one at a
//! time, so mutations never interleave and every rewrite of the backing store
//! sees a consistent collection.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::commands::{self, NewTask, TaskView};
use crate::error::{Error, Result};
use crate::repository::TaskRepository;

enum Request {
    AddTask(NewTask, Sender<Result<String>>),
    GetAllTasks(Sender<Vec<TaskView>>),
    GetTask(String, Sender<Option<TaskView>>),
    GetTasksForDate(String, Sender<Result<Vec<TaskView>>>),
    Sorted(Sender<Vec<TaskView>>),
    Active(Sender<Vec<TaskView>>),
    DeleteTask(String, Sender<Result<bool>>),
    CompleteTask(String, Sender<Result<bool>>),
    UpdateNotes(String, String, Sender<Result<bool>>),
    Cleanup(u32, Sender<Result<usize>>),
    Reload(Sender<Result<()>>),
    Shutdown,
}

/// Cloneable, thread-safe handle to a running worker
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    tx: Sender<Request>,
}

/// The worker thread and a handle to it
pub struct RepositoryWorker {
    handle: WorkerHandle,
    thread: JoinHandle<TaskRepository>,
}

impl RepositoryWorker {
    /// Move `repo` onto a new thread and start serving requests.
    pub fn spawn(repo: TaskRepository) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("prowork-repository".to_string())
            .spawn(move || serve(repo, rx))?;
        Ok(Self {
            handle: WorkerHandle { tx },
            thread,
        })
    }

    pub fn handle(&self) -> WorkerHandle {
        self.handle.clone()
    }

    /// Stop the worker after the requests already queued and hand back the
    /// repository. Outstanding handles get [`Error::WorkerStopped`] afterwards.
    pub fn shutdown(self) -> Result<TaskRepository> {
        let _ = self.handle.tx.send(Request::Shutdown);
        self.thread
            .join()
            .map_err(|_| Error::OperationFailed("repository worker panicked".to_string()))
    }
}

fn serve(mut repo: TaskRepository, rx: Receiver<Request>) -> TaskRepository {
    tracing::debug!("repository worker started");
    while let Ok(request) = rx.recv() {
        match request {
            Request::AddTask(new_task, reply) => {
                let _ = reply.send(commands::add_task(&mut repo, &new_task));
            }
            Request::GetAllTasks(reply) => {
                let _ = reply.send(commands::get_all_tasks(&repo));
            }
            Request::GetTask(id, reply) => {
                let _ = reply.send(commands::get_task(&repo, &id));
            }
            Request::GetTasksForDate(date, reply) => {
                let _ = reply.send(commands::get_tasks_for_date(&repo, &date));
            }
            Request::Sorted(reply) => {
                let _ = reply.send(repo.sorted().iter().map(TaskView::from).collect());
            }
            Request::Active(reply) => {
                let _ = reply.send(repo.active().iter().map(TaskView::from).collect());
            }
            Request::DeleteTask(id, reply) => {
                let _ = reply.send(commands::delete_task(&mut repo, &id));
            }
            Request::CompleteTask(id, reply) => {
                let _ = reply.send(commands::complete_task(&mut repo, &id));
            }
            Request::UpdateNotes(id, notes, reply) => {
                let _ = reply.send(commands::update_notes(&mut repo, &id, &notes));
            }
            Request::Cleanup(days, reply) => {
                let _ = reply.send(repo.cleanup(days));
            }
            Request::Reload(reply) => {
                let _ = reply.send(repo.reload());
            }
            Request::Shutdown => break,
        }
    }
    tracing::debug!("repository worker stopped");
    repo
}

impl WorkerHandle {
    fn call<T>(&self, make: impl FnOnce(Sender<T>) -> Request) -> Result<T> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(make(reply_tx))
            .map_err(|_| Error::WorkerStopped)?;
        reply_rx.recv().map_err(|_| Error::WorkerStopped)
    }

    pub fn add_task(&self, request: NewTask) -> Result<String> {
        self.call(|reply| Request::AddTask(request, reply))?
    }

    pub fn get_all_tasks(&self) -> Result<Vec<TaskView>> {
        self.call(Request::GetAllTasks)
    }

    pub fn get_task(&self, id: &str) -> Result<Option<TaskView>> {
        self.call(|reply| Request::GetTask(id.to_string(), reply))
    }

    pub fn get_tasks_for_date(&self, date: &str) -> Result<Vec<TaskView>> {
        self.call(|reply| Request::GetTasksForDate(date.to_string(), reply))?
    }

    pub fn sorted(&self) -> Result<Vec<TaskView>> {
        self.call(Request::Sorted)
    }

    pub fn active(&self) -> Result<Vec<TaskView>> {
        self.call(Request::Active)
    }

    pub fn delete_task(&self, id: &str) -> Result<bool> {
        self.call(|reply| Request::DeleteTask(id.to_string(), reply))?
    }

    pub fn complete_task(&self, id: &str) -> Result<bool> {
        self.call(|reply| Request::CompleteTask(id.to_string(), reply))?
    }

    pub fn update_notes(&self, id: &str, notes: &str) -> Result<bool> {
        self.call(|reply| Request::UpdateNotes(id.to_string(), notes.to_string(), reply))?
    }

    pub fn cleanup(&self, days_old: u32) -> Result<usize> {
        self.call(|reply| Request::Cleanup(days_old, reply))?
    }

    pub fn reload(&self) -> Result<()> {
        self.call(Request::Reload)?
    }
}

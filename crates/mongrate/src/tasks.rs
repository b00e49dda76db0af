//! Task table - dispatch of named tasks with an optional argument
//!
//! The table is built once: each task name is bound to an async operation and
//! one task is marked as the default, run when no task name is given.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

use crate::error::{MigrationError, MigrationResult};
use crate::migrations::MigrationManager;

/// Future returned by a bound task
pub type TaskFuture = Pin<Box<dyn Future<Output = MigrationResult<()>> + Send>>;

type TaskFn = Arc<dyn Fn(Option<String>) -> TaskFuture + Send + Sync>;

pub const STATUS_TASK: &str = "status";
pub const EXECUTE_TASK: &str = "execute";
pub const IGNORE_TASK: &str = "ignore";
pub const ROLLBACK_TASK: &str = "rollback";

/// Registration table mapping task names to operations
#[derive(Default, Clone)]
pub struct TaskTable {
    tasks: HashMap<String, TaskFn>,
    default: Option<String>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a task name to an operation, replacing any previous binding
    pub fn register<F, Fut>(mut self, name: impl Into<String>, task: F) -> Self
    where
        F: Fn(Option<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = MigrationResult<()>> + Send + 'static,
    {
        let bound: TaskFn = Arc::new(move |arg| Box::pin(task(arg)) as TaskFuture);
        self.tasks.insert(name.into(), bound);
        self
    }

    /// Mark a task as the one run when no task name is given
    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default = Some(name.into());
        self
    }

    pub fn default_task(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Registered task names, sorted
    pub fn task_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Run a task by name, or the default task when `task` is `None`
    ///
    /// The default task is always called without an argument.
    pub async fn dispatch(&self, task: Option<&str>, arg: Option<String>) -> MigrationResult<()> {
        let (name, arg) = match task {
            Some(name) => (name, arg),
            None => match self.default.as_deref() {
                Some(name) => (name, None),
                None => {
                    return Err(MigrationError::UnknownTask {
                        name: "<default>".to_string(),
                        available: self.task_names(),
                    })
                }
            },
        };

        let handler = self
            .tasks
            .get(name)
            .cloned()
            .ok_or_else(|| MigrationError::UnknownTask {
                name: name.to_string(),
                available: self.task_names(),
            })?;

        debug!(task = name, arg = ?arg, "Dispatching task");
        handler(arg).await
    }
}

/// The standard table: `status` (default), `execute`, `ignore` and `rollback`
pub fn migration_tasks(manager: Arc<MigrationManager>) -> TaskTable {
    let status = Arc::clone(&manager);
    let execute = Arc::clone(&manager);
    let ignore = Arc::clone(&manager);
    let rollback = manager;

    TaskTable::new()
        .register(STATUS_TASK, move |_arg| {
            let manager = Arc::clone(&status);
            async move { manager.show_status().await }
        })
        .register(EXECUTE_TASK, move |arg: Option<String>| {
            let manager = Arc::clone(&execute);
            async move { manager.execute(arg.as_deref()).await.map(|_| ()) }
        })
        .register(IGNORE_TASK, move |arg: Option<String>| {
            let manager = Arc::clone(&ignore);
            async move { manager.ignore(arg.as_deref()).await.map(|_| ()) }
        })
        .register(ROLLBACK_TASK, move |arg: Option<String>| {
            let manager = Arc::clone(&rollback);
            async move {
                match arg {
                    Some(target) => manager.rollback(&target).await,
                    None => Err(MigrationError::MissingTaskArgument {
                        task: ROLLBACK_TASK.to_string(),
                    }),
                }
            }
        })
        .with_default(STATUS_TASK)
}

//! Task state machine and store
use fps_core::report::SimulationReport;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Identifier of a background simulation task.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// One background simulation with its progress and outcome.
///
/// Serializable so a host can surface task status to its own callers.
#[derive(Serialize, Debug, Clone)]
pub struct SimulationTask {
    pub id: TaskId,
    pub status: TaskStatus,
    /// Integer percentage, monotone over the task's lifetime.
    pub progress: u8,
    pub error: Option<String>,
    pub report: Option<SimulationReport>,
}

impl SimulationTask {
    fn new(id: TaskId) -> Self {
        SimulationTask {
            id,
            status: TaskStatus::Pending,
            progress: 0,
            error: None,
            report: None,
        }
    }
}

/// In-memory task registry, shared across threads.
#[derive(Debug, Default, Clone)]
pub struct TaskStore {
    inner: Arc<Mutex<StoreInner>>,
}

#[derive(Debug, Default)]
struct StoreInner {
    next_id: u64,
    tasks: BTreeMap<TaskId, SimulationTask>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending task.
    pub fn create(&self) -> TaskId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = TaskId(inner.next_id);
        inner.tasks.insert(id, SimulationTask::new(id));
        id
    }

    pub fn get(&self, id: TaskId) -> Option<SimulationTask> {
        self.lock().tasks.get(&id).cloned()
    }

    pub fn set_running(&self, id: TaskId) {
        self.with_task(id, |task| task.status = TaskStatus::Running);
    }

    /// Raise the task's progress; lower values are ignored so reporting
    /// stays monotone.
    pub fn update_progress(&self, id: TaskId, progress: u8) {
        self.with_task(id, |task| task.progress = task.progress.max(progress));
    }

    pub fn complete(&self, id: TaskId, report: SimulationReport) {
        self.with_task(id, |task| {
            task.status = TaskStatus::Completed;
            task.progress = 100;
            task.report = Some(report);
        });
    }

    pub fn fail(&self, id: TaskId, message: String) {
        self.with_task(id, |task| {
            task.status = TaskStatus::Failed;
            task.error = Some(message);
        });
    }

    fn with_task<F: FnOnce(&mut SimulationTask)>(&self, id: TaskId, f: F) {
        if let Some(task) = self.lock().tasks.get_mut(&id) {
            f(task);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        // A poisoned store means a panic elsewhere already ended the run.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

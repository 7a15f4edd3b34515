// In-memory TaskStore implementation
// Insertion-ordered Vec behind one mutex: the single serialization point

use chrono::Duration;
use jetsite_core::domain::{StatusUpdate, Task, TaskId, TaskPayload, TaskStatus};
use jetsite_core::error::{AppError, Result};
use jetsite_core::port::{IdProvider, StatusCounts, TaskStore, TimeProvider};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Process-memory task store.
///
/// Every operation is one short critical section. A poisoned lock is
/// recovered since no operation leaves the Vec half-updated.
pub struct InMemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl InMemoryTaskStore {
    pub fn new(id_provider: Arc<dyn IdProvider>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            id_provider,
            time_provider,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Task>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskStore for InMemoryTaskStore {
    fn add(&self, payload: TaskPayload) -> TaskId {
        let id = self.id_provider.generate_id();
        let task = Task::new(id.clone(), self.time_provider.now(), payload);
        self.lock().push(task);
        debug!(task_id = %id, "Task added");
        id
    }

    fn next_pending(&self) -> Option<Task> {
        self.lock()
            .iter()
            .find(|t| t.status == TaskStatus::Pending)
            .cloned()
    }

    fn set_status(&self, id: &str, update: StatusUpdate) -> Result<bool> {
        let now = self.time_provider.now();
        let mut tasks = self.lock();
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            warn!(task_id = %id, "Status update for unknown task ignored");
            return Ok(false);
        };

        task.apply(update, now).map_err(AppError::from)?;
        debug!(task_id = %id, status = %task.status, "Task status updated");
        Ok(true)
    }

    fn get(&self, id: &str) -> Option<Task> {
        self.lock().iter().find(|t| t.id == id).cloned()
    }

    fn list(&self, status: Option<TaskStatus>, limit: Option<usize>) -> Vec<Task> {
        self.lock()
            .iter()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    fn counts(&self) -> StatusCounts {
        self.lock()
            .iter()
            .fold(StatusCounts::default(), |mut counts, t| {
                counts.record(t.status);
                counts
            })
    }

    fn evict_stale(&self, retention: Duration) -> usize {
        let now = self.time_provider.now();
        let mut tasks = self.lock();
        let before = tasks.len();
        tasks.retain(|t| !(t.is_terminal() && now - t.updated_at > retention));
        before - tasks.len()
    }
}

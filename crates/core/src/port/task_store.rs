// Task Store Port (Interface)

use crate::domain::{StatusUpdate, Task, TaskId, TaskPayload, TaskStatus};
use crate::error::Result;
use chrono::Duration;
use serde::Serialize;

/// Per-status task counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Pending => self.pending += 1,
            TaskStatus::Processing => self.processing += 1,
            TaskStatus::Completed => self.completed += 1,
            TaskStatus::Failed => self.failed += 1,
        }
        self.total += 1;
    }
}

/// Ordered, process-memory-resident task storage.
///
/// Every operation is a short synchronous critical section; none of them may
/// block on I/O. Implementations own identity and timestamp assignment.
pub trait TaskStore: Send + Sync {
    /// Append a new `pending` task and return its identity
    fn add(&self, payload: TaskPayload) -> TaskId;

    /// Oldest task still `pending`, in insertion order
    fn next_pending(&self) -> Option<Task>;

    /// Apply a status update in place.
    ///
    /// Returns `Ok(false)` when the identity is unknown (no-op) and an error
    /// when the transition would break monotonicity.
    fn set_status(&self, id: &str, update: StatusUpdate) -> Result<bool>;

    /// Find task by ID
    fn get(&self, id: &str) -> Option<Task>;

    /// Tasks in insertion order, optionally filtered by status and truncated
    fn list(&self, status: Option<TaskStatus>, limit: Option<usize>) -> Vec<Task>;

    /// Count tasks by status
    fn counts(&self) -> StatusCounts;

    /// Remove terminal tasks whose last update is older than `retention`.
    ///
    /// Returns the number of evicted tasks.
    fn evict_stale(&self, retention: Duration) -> usize;
}

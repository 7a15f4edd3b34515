// Intake Use Case - the single entry point that appends new tasks

use crate::domain::{TaskId, TaskPayload};
use crate::error::{AppError, Result};
use crate::port::{QueuedTask, TaskStore};
use std::sync::Arc;
use tracing::info;

/// Message returned to callers that omit `template` or `name`
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: template and name";

/// Task intake service
pub struct TaskIntake {
    store: Arc<dyn TaskStore>,
}

impl TaskIntake {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Validate a caller-supplied payload and append it as `pending`.
    ///
    /// # Errors
    /// `AppError::Validation` when `template` or `name` is missing
    pub fn submit(&self, payload: TaskPayload) -> Result<TaskId> {
        if payload.validate().is_err() {
            return Err(AppError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        }

        let id = self.store.add(payload);
        info!(task_id = %id, "Task queued");
        Ok(id)
    }

    /// Append a task fetched from the remote queue.
    ///
    /// Not validated here: a malformed entry is stored and fails when driven,
    /// so it stays visible through the task listing.
    pub fn accept_queued(&self, queued: QueuedTask) -> TaskId {
        let id = self.store.add(queued.payload);
        info!(task_id = %id, remote_id = ?queued.id, "Task received from queue");
        id
    }
}

// Task Domain Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, Result};

/// Task ID (UUID v4 in production)
pub type TaskId = String;

/// Default repository visibility when the request omits it
pub const DEFAULT_VISIBILITY: &str = "public";

/// Task Status
///
/// Transitions are one-directional: `Pending -> Processing -> {Completed | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "processing" => Ok(TaskStatus::Processing),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            other => Err(DomainError::Validation(format!(
                "Unknown task status: {}",
                other
            ))),
        }
    }
}

/// Optional secondary automation run after the template script succeeds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostProcessingDirectives {
    #[serde(default)]
    pub start_server: bool,
    #[serde(default)]
    pub custom_commands: Vec<String>,
}

impl PostProcessingDirectives {
    pub fn is_empty(&self) -> bool {
        !self.start_server && self.custom_commands.is_empty()
    }
}

/// Repository creation request, defaulted at creation time.
///
/// `template` and `name` may arrive empty from the external queue; they are
/// validated when the task is driven, not when it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_visibility")]
    pub visibility: String,
    #[serde(rename = "noVSCode", default)]
    pub no_vscode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_commands: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_processing: Option<PostProcessingDirectives>,
}

fn default_visibility() -> String {
    DEFAULT_VISIBILITY.to_string()
}

impl TaskPayload {
    pub fn new(template: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            name: name.into(),
            visibility: default_visibility(),
            no_vscode: false,
            post_commands: None,
            post_processing: None,
        }
    }

    /// Check that the fields the template script cannot run without are present
    pub fn validate(&self) -> Result<()> {
        if self.template.trim().is_empty() || self.name.trim().is_empty() {
            return Err(DomainError::Validation(
                "Missing required parameters: template and name".to_string(),
            ));
        }
        Ok(())
    }
}

/// Summary recorded on a completed task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub success: bool,
    pub repository_name: String,
    pub working_directory: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Status change requested against the store.
///
/// Carrying the result or the error inside the variant keeps
/// "exactly one of result/error once terminal" true by construction.
#[derive(Debug, Clone)]
pub enum StatusUpdate {
    Processing,
    Completed(TaskResult),
    Failed(String),
}

impl StatusUpdate {
    pub fn status(&self) -> TaskStatus {
        match self {
            StatusUpdate::Processing => TaskStatus::Processing,
            StatusUpdate::Completed(_) => TaskStatus::Completed,
            StatusUpdate::Failed(_) => TaskStatus::Failed,
        }
    }
}

/// Task Entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(flatten)]
    pub payload: TaskPayload,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Task {
    /// Create a new pending task
    ///
    /// # Arguments
    ///
    /// * `id` - Unique task ID (injected, not generated)
    /// * `now` - Creation time (injected, not system time)
    /// * `payload` - Repository creation request
    pub fn new(id: impl Into<String>, now: DateTime<Utc>, payload: TaskPayload) -> Self {
        Self {
            id: id.into(),
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
            payload,
            result: None,
            error: None,
        }
    }

    /// Apply a status update, refusing anything but forward transitions
    pub fn apply(&mut self, update: StatusUpdate, now: DateTime<Utc>) -> Result<()> {
        let to = update.status();
        let allowed = matches!(
            (self.status, to),
            (TaskStatus::Pending, TaskStatus::Processing)
                | (TaskStatus::Processing, TaskStatus::Completed)
                | (TaskStatus::Processing, TaskStatus::Failed)
        );
        if !allowed {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }

        match update {
            StatusUpdate::Processing => {}
            StatusUpdate::Completed(result) => self.result = Some(result),
            StatusUpdate::Failed(error) => self.error = Some(error),
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

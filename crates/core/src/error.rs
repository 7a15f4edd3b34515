// Central Error Types for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Why a single task failed.
///
/// Every variant except `PostProcessing` is fatal to the task and recorded on
/// it; `PostProcessing` is only ever logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("{0}")]
    Validation(String),

    #[error("Missing required dependencies: {}", .0.join(", "))]
    DependencyMissing(Vec<String>),

    #[error("{0}")]
    Authentication(String),

    #[error("Script exited with code {}\n{stderr}", display_exit_code(.exit_code))]
    ScriptFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to launch script: {0}")]
    ScriptSpawn(String),

    #[error("Post-processing command failed: {command}: {reason}")]
    PostProcessing { command: String, reason: String },
}

impl TaskError {
    /// Stable category name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            TaskError::Validation(_) => "validation",
            TaskError::DependencyMissing(_) => "dependency_missing",
            TaskError::Authentication(_) => "authentication",
            TaskError::ScriptFailed { .. } | TaskError::ScriptSpawn(_) => "script_execution",
            TaskError::PostProcessing { .. } => "post_processing",
        }
    }
}

impl From<crate::domain::DomainError> for TaskError {
    fn from(err: crate::domain::DomainError) -> Self {
        TaskError::Validation(err.to_string())
    }
}

fn display_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

// Domain Layer - Pure business logic and entities

pub mod error;
pub mod task;

// Re-exports
pub use error::DomainError;
pub use task::{
    PostProcessingDirectives, StatusUpdate, Task, TaskId, TaskPayload, TaskResult, TaskStatus,
    DEFAULT_VISIBILITY,
};

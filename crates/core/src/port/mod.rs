// Port Layer - Interfaces for external dependencies

pub mod command_runner;
pub mod credential_provider;
pub mod id_provider; // For deterministic testing
pub mod queue_source;
pub mod task_store;
pub mod time_provider;
pub mod tool_probe;

// Re-exports
pub use command_runner::{
    shell_command, CommandOutput, CommandRunner, CommandSpec, ExecutionError,
};
pub use credential_provider::CredentialProvider;
pub use id_provider::IdProvider;
pub use queue_source::{QueueError, QueueSource, QueuedTask};
pub use task_store::{StatusCounts, TaskStore};
pub use time_provider::TimeProvider;
pub use tool_probe::ToolProbe;

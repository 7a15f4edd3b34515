// Application Layer - Use Cases and Business Logic

pub mod eviction;
pub mod intake;
pub mod orchestrator;
pub mod post_processing;
pub mod processor;
pub mod queue_poller;
pub mod script_runner;

// Re-exports
pub use eviction::EvictionScheduler;
pub use intake::TaskIntake;
pub use orchestrator::{DependencyReport, TaskOrchestrator};
pub use post_processing::{PostProcessingReport, PostProcessor};
pub use processor::{shutdown_channel, ShutdownSender, ShutdownToken, TaskProcessor};
pub use queue_poller::QueuePoller;
pub use script_runner::{HostPlatform, ScriptConfig, ScriptRunner};

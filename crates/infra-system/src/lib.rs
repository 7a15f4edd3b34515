// Jetsite Infrastructure - System Adapters
// Implements: CommandRunner, ToolProbe

pub mod command_runner;
pub mod tool_probe;

pub use command_runner::TokioCommandRunner;
pub use tool_probe::WhichToolProbe;

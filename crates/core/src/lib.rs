// Jetsite Core - Task lifecycle domain, ports and orchestration
// NO infrastructure dependencies (hexagonal layout)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result, TaskError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

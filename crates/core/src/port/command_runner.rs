// Command Runner Port
// Abstraction for spawning one external command and collecting its output

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Everything needed to spawn one child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Added on top of the inherited environment
    pub env: Vec<(String, String)>,
    /// Tag attached to every forwarded output line (usually the task id)
    pub label: String,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
            env: Vec::new(),
            label: String::new(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Value of an injected environment variable, if any
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Output of a child that ran to completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the child was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: i64,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Execution errors (the child never produced an exit status)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Command Runner trait
///
/// Implementations:
/// - TokioCommandRunner: spawns a real child process and streams its output
/// - ScriptedCommandRunner: canned results for tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion.
    ///
    /// A non-zero exit status is NOT an error here; callers interpret
    /// `CommandOutput::exit_code`.
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the executable cannot be started
    /// - ExecutionError::IoError if waiting on the child fails
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecutionError>;
}

/// Host shell wrapper for a free-form command line (`sh -c` / `cmd /C`)
pub fn shell_command(line: &str, working_dir: impl Into<PathBuf>) -> CommandSpec {
    if cfg!(windows) {
        CommandSpec::new("cmd", working_dir).args(["/C", line])
    } else {
        CommandSpec::new("sh", working_dir).args(["-c", line])
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Mutex, PoisonError};

    /// Canned response for one call
    #[derive(Debug, Clone)]
    pub enum MockResponse {
        Exit {
            code: i32,
            stdout: String,
            stderr: String,
        },
        SpawnError(String),
    }

    impl MockResponse {
        pub fn ok(stdout: impl Into<String>) -> Self {
            MockResponse::Exit {
                code: 0,
                stdout: stdout.into(),
                stderr: String::new(),
            }
        }

        pub fn fail(code: i32, stderr: impl Into<String>) -> Self {
            MockResponse::Exit {
                code,
                stdout: String::new(),
                stderr: stderr.into(),
            }
        }
    }

    /// Runner that replays queued responses in call order and records every
    /// spec it was asked to run. Once the queue is empty every call succeeds
    /// with empty output.
    #[derive(Default)]
    pub struct ScriptedCommandRunner {
        responses: Mutex<VecDeque<MockResponse>>,
        calls: Mutex<Vec<CommandSpec>>,
    }

    impl ScriptedCommandRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_responses(responses: impl IntoIterator<Item = MockResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<CommandSpec> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedCommandRunner {
        async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecutionError> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(spec.clone());

            let next = self
                .responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();

            match next {
                None => Ok(CommandOutput {
                    exit_code: Some(0),
                    ..CommandOutput::default()
                }),
                Some(MockResponse::Exit {
                    code,
                    stdout,
                    stderr,
                }) => Ok(CommandOutput {
                    exit_code: Some(code),
                    stdout,
                    stderr,
                    duration_ms: 1,
                }),
                Some(MockResponse::SpawnError(msg)) => Err(ExecutionError::SpawnFailed(msg)),
            }
        }
    }
}

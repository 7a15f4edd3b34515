// Tokio command runner
// Spawns one child, forwards its output line by line, collects it

use async_trait::async_trait;
use jetsite_core::port::{CommandOutput, CommandRunner, CommandSpec, ExecutionError};
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{info, warn};

/// Consecutive read errors tolerated before a stream is abandoned
const MAX_READ_FAILURES: u32 = 3;

/// Which stream a line came from
#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Real child-process runner
#[derive(Debug, Default, Clone)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

/// Read `reader` to EOF, logging every line and returning the full text.
///
/// Lines are split on raw `\n` and decoded lossily, so bytes that are not
/// UTF-8 never stop the drain. Output is kept exactly as written.
async fn drain_lines<R>(reader: Option<R>, stream: Stream, label: &str) -> String
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return String::new();
    };

    let mut reader = BufReader::new(reader);
    let mut collected = Vec::new();
    let mut line = Vec::new();
    let mut failures = 0;
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                failures = 0;
                let text = String::from_utf8_lossy(&line);
                let text = text.trim_end_matches(['\n', '\r']);
                match stream {
                    Stream::Stdout => info!(task_id = %label, "{}", text),
                    Stream::Stderr => warn!(task_id = %label, "{}", text),
                }
                collected.extend_from_slice(&line);
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(task_id = %label, stream = ?stream, error = %e, "Output stream read failed");
                failures += 1;
                if failures >= MAX_READ_FAILURES {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&collected).into_owned()
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecutionError> {
        let started = Instant::now();
        info!(
            task_id = %spec.label,
            command = %spec.program,
            args = ?spec.args,
            working_dir = %spec.working_dir.display(),
            "Starting child process"
        );

        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&spec.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", spec.program, e)))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (stdout, stderr, status) = tokio::join!(
            drain_lines(stdout, Stream::Stdout, &spec.label),
            drain_lines(stderr, Stream::Stderr, &spec.label),
            child.wait(),
        );
        let status = status.map_err(|e| ExecutionError::IoError(e.to_string()))?;

        let duration_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
        let output = CommandOutput {
            exit_code: status.code(),
            stdout,
            stderr,
            duration_ms,
        };

        info!(
            task_id = %spec.label,
            command = %spec.program,
            exit_code = ?output.exit_code,
            duration_ms,
            "Child process exited"
        );
        Ok(output)
    }
}

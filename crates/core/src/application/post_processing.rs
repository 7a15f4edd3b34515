//! Post-Processing Pipeline
//!
//! Best-effort automation after the template script succeeded: an optional
//! dev-server bootstrap and an ordered list of custom commands. Nothing here
//! can fail the owning task; failures are logged and counted.

use crate::domain::PostProcessingDirectives;
use crate::error::TaskError;
use crate::port::{shell_command, CommandRunner};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Project markers checked in order; the first one present wins
pub const DEV_SERVER_MARKERS: [(&str, &str); 2] = [
    ("package.json", "npm install && npm run dev"),
    (
        "requirements.txt",
        "pip install -r requirements.txt && python manage.py runserver",
    ),
];

/// Install-and-serve command for the first marker found in `project_dir`
pub fn detect_dev_server(project_dir: &Path) -> Option<&'static str> {
    DEV_SERVER_MARKERS
        .iter()
        .find(|(marker, _)| project_dir.join(marker).is_file())
        .map(|(_, command)| *command)
}

/// What a pipeline run did (for logs and tests; never stored on the task)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostProcessingReport {
    pub dev_server: Option<String>,
    pub commands_run: usize,
    pub failures: Vec<TaskError>,
}

pub struct PostProcessor {
    runner: Arc<dyn CommandRunner>,
}

impl PostProcessor {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Run every directive against `project_dir`
    pub async fn run(
        &self,
        task_id: &str,
        project_dir: &Path,
        directives: &PostProcessingDirectives,
    ) -> PostProcessingReport {
        let mut report = PostProcessingReport::default();

        if directives.start_server {
            report.dev_server = self.start_dev_server(task_id, project_dir);
        }

        for command in &directives.custom_commands {
            report.commands_run += 1;
            match self.run_command(task_id, project_dir, command).await {
                Ok(()) => info!(task_id = %task_id, command = %command, "Custom command completed"),
                Err(e) => {
                    warn!(task_id = %task_id, command = %command, error = %e, "Custom command failed");
                    report.failures.push(e);
                }
            }
        }

        report
    }

    /// Launch the dev server in the background.
    ///
    /// The serve command does not exit on its own, so it runs on a detached
    /// task and must not hold the single-flight slot.
    fn start_dev_server(&self, task_id: &str, project_dir: &Path) -> Option<String> {
        let Some(command) = detect_dev_server(project_dir) else {
            info!(task_id = %task_id, dir = %project_dir.display(), "No dev server marker found");
            return None;
        };

        info!(task_id = %task_id, command = %command, "Starting development server");
        let spec = shell_command(command, project_dir).label(task_id);
        let runner = Arc::clone(&self.runner);
        let task_id = task_id.to_string();
        tokio::spawn(async move {
            match runner.run(&spec).await {
                Ok(output) if output.success() => {
                    info!(task_id = %task_id, "Development server exited")
                }
                Ok(output) => warn!(
                    task_id = %task_id,
                    exit_code = ?output.exit_code,
                    "Development server exited with failure"
                ),
                Err(e) => warn!(task_id = %task_id, error = %e, "Development server failed to start"),
            }
        });

        Some(command.to_string())
    }

    async fn run_command(
        &self,
        task_id: &str,
        project_dir: &Path,
        command: &str,
    ) -> Result<(), TaskError> {
        let spec = shell_command(command, project_dir).label(task_id);
        let output = self
            .runner
            .run(&spec)
            .await
            .map_err(|e| TaskError::PostProcessing {
                command: command.to_string(),
                reason: e.to_string(),
            })?;

        if output.success() {
            Ok(())
        } else {
            Err(TaskError::PostProcessing {
                command: command.to_string(),
                reason: format!(
                    "exit code {:?}: {}",
                    output.exit_code,
                    output.stderr.trim()
                ),
            })
        }
    }
}

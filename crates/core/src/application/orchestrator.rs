// Task Orchestrator - the sequence driven for one processing task
//
// validate payload -> check tools -> template script -> post-processing

use crate::application::post_processing::PostProcessor;
use crate::application::processor::constants::{EDITOR_PROGRAM, REQUIRED_TOOLS};
use crate::application::script_runner::ScriptRunner;
use crate::domain::{Task, TaskResult};
use crate::error::TaskError;
use crate::port::ToolProbe;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Availability of every external program a task may touch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    pub tools: Vec<(String, bool)>,
    /// Subset of `tools` that block execution when missing
    pub required: Vec<String>,
}

impl DependencyReport {
    /// Required programs that are not installed
    pub fn missing(&self) -> Vec<String> {
        self.tools
            .iter()
            .filter(|(name, available)| !available && self.required.contains(name))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

pub struct TaskOrchestrator {
    script: Arc<ScriptRunner>,
    post_processor: Arc<PostProcessor>,
    tool_probe: Arc<dyn ToolProbe>,
}

impl TaskOrchestrator {
    pub fn new(
        script: Arc<ScriptRunner>,
        post_processor: Arc<PostProcessor>,
        tool_probe: Arc<dyn ToolProbe>,
    ) -> Self {
        Self {
            script,
            post_processor,
            tool_probe,
        }
    }

    /// Probe `gh`, `git`, the script shell, and the editor when it will be opened
    pub fn check_dependencies(&self) -> DependencyReport {
        let shell = self.script.platform().script_shell();
        let mut required: Vec<String> = REQUIRED_TOOLS.iter().map(|t| t.to_string()).collect();
        required.push(shell.to_string());

        let mut names = required.clone();
        if self.script.config().auto_open_editor {
            names.push(EDITOR_PROGRAM.to_string());
        }

        let tools = names
            .into_iter()
            .map(|name| {
                let available = self.tool_probe.is_available(&name);
                (name, available)
            })
            .collect();

        DependencyReport { tools, required }
    }

    /// Drive `task` to a result, or the first fatal error
    pub async fn execute(&self, task: &Task) -> Result<TaskResult, TaskError> {
        info!(task_id = %task.id, template = %task.payload.template, name = %task.payload.name, "Executing task");

        task.payload.validate()?;

        let report = self.check_dependencies();
        info!(task_id = %task.id, tools = ?report.tools, "Dependency check");
        let missing = report.missing();
        if !missing.is_empty() {
            return Err(TaskError::DependencyMissing(missing));
        }

        let output = self.script.run(task).await?;
        let project_dir = self.script.project_dir(&task.payload);

        if let Some(directives) = task.payload.post_processing.as_ref().filter(|d| !d.is_empty()) {
            let report = self
                .post_processor
                .run(&task.id, &project_dir, directives)
                .await;
            if !report.failures.is_empty() {
                warn!(
                    task_id = %task.id,
                    failed = report.failures.len(),
                    total = report.commands_run,
                    "Post-processing finished with failures"
                );
            }
        }

        Ok(TaskResult {
            success: true,
            repository_name: task.payload.name.clone(),
            working_directory: project_dir.display().to_string(),
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

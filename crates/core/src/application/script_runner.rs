//! Script Runner - drives the template script for one task
//!
//! Resolves and verifies the hosting token, builds the fixed-order argument
//! list, picks the script variant for the host platform and maps the child's
//! exit status to a task outcome. Spawning and output streaming are delegated
//! to the `CommandRunner` port.

use crate::domain::{Task, TaskPayload};
use crate::error::TaskError;
use crate::port::{CommandOutput, CommandRunner, CommandSpec, CredentialProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Environment variables that receive the resolved token (provider-specific, generic)
pub const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

const AUTH_REQUIRED_MESSAGE: &str = "GitHub authentication required. Please run: gh auth login";
const AUTH_REJECTED_MESSAGE: &str =
    "GitHub token was rejected by the identity endpoint. Please run: gh auth login";

/// Static settings for the template script
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// Path to the PowerShell variant; the shell variant sits next to it as `.sh`
    pub script_path: PathBuf,
    /// Root under which every project is created
    pub work_dir: PathBuf,
    /// When false, `-noVSCode` is always passed
    pub auto_open_editor: bool,
}

/// Host family, selecting the script variant and shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Windows,
    Unix,
}

impl HostPlatform {
    pub fn current() -> Self {
        if cfg!(windows) {
            HostPlatform::Windows
        } else {
            HostPlatform::Unix
        }
    }

    /// Shell program that runs the script
    pub fn script_shell(self) -> &'static str {
        match self {
            HostPlatform::Windows => "powershell",
            HostPlatform::Unix => "bash",
        }
    }

    /// Program and leading arguments for running `script`
    pub fn script_invocation(self, script: &Path) -> (String, Vec<String>) {
        match self {
            HostPlatform::Windows => (
                self.script_shell().to_string(),
                vec![
                    "-ExecutionPolicy".to_string(),
                    "Bypass".to_string(),
                    "-File".to_string(),
                    script.display().to_string(),
                ],
            ),
            HostPlatform::Unix => {
                let script = if script.extension().is_some_and(|ext| ext == "ps1") {
                    script.with_extension("sh")
                } else {
                    script.to_path_buf()
                };
                (
                    self.script_shell().to_string(),
                    vec![script.display().to_string()],
                )
            }
        }
    }
}

/// Build the script arguments in their fixed order:
/// `-template <t> -name <n> -quiet [-visibility <v>] [-noVSCode] [-postCommands <c>]`
pub fn build_script_args(payload: &TaskPayload, auto_open_editor: bool) -> Vec<String> {
    let mut args = vec![
        "-template".to_string(),
        payload.template.clone(),
        "-name".to_string(),
        payload.name.clone(),
        "-quiet".to_string(),
    ];

    if !payload.visibility.is_empty() {
        args.push("-visibility".to_string());
        args.push(payload.visibility.clone());
    }

    if !auto_open_editor || payload.no_vscode {
        args.push("-noVSCode".to_string());
    }

    if let Some(post_commands) = payload.post_commands.as_deref().filter(|c| !c.is_empty()) {
        args.push("-postCommands".to_string());
        args.push(post_commands.to_string());
    }

    args
}

/// Process Runner for the template script
pub struct ScriptRunner {
    config: ScriptConfig,
    platform: HostPlatform,
    credentials: Arc<dyn CredentialProvider>,
    runner: Arc<dyn CommandRunner>,
}

impl ScriptRunner {
    pub fn new(
        config: ScriptConfig,
        credentials: Arc<dyn CredentialProvider>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            config,
            platform: HostPlatform::current(),
            credentials,
            runner,
        }
    }

    /// Override the detected platform
    pub fn with_platform(mut self, platform: HostPlatform) -> Self {
        self.platform = platform;
        self
    }

    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    pub fn platform(&self) -> HostPlatform {
        self.platform
    }

    /// Directory the script creates the project in
    pub fn project_dir(&self, payload: &TaskPayload) -> PathBuf {
        self.config.work_dir.join(&payload.name)
    }

    /// Full command for `task` with the token injected under both aliases
    pub fn command_for(&self, task: &Task, token: &str) -> CommandSpec {
        let (program, mut args) = self.platform.script_invocation(&self.config.script_path);
        args.extend(build_script_args(&task.payload, self.config.auto_open_editor));

        TOKEN_ENV_VARS.iter().fold(
            CommandSpec::new(program, &self.config.work_dir)
                .args(args)
                .label(&task.id),
            |spec, var| spec.env(*var, token),
        )
    }

    /// Run the template script for `task`.
    ///
    /// No child is spawned unless a token resolves and verifies.
    pub async fn run(&self, task: &Task) -> Result<CommandOutput, TaskError> {
        let token = self
            .credentials
            .resolve_token()
            .await
            .ok_or_else(|| TaskError::Authentication(AUTH_REQUIRED_MESSAGE.to_string()))?;

        if !self.credentials.verify(&token).await {
            return Err(TaskError::Authentication(AUTH_REJECTED_MESSAGE.to_string()));
        }

        let spec = self.command_for(task, &token);
        info!(
            task_id = %task.id,
            program = %spec.program,
            args = ?spec.args,
            "Running template script"
        );

        let output = self.runner.run(&spec).await.map_err(|e| {
            error!(task_id = %task.id, error = %e, "Template script could not be started");
            TaskError::ScriptSpawn(e.to_string())
        })?;

        if output.success() {
            Ok(output)
        } else {
            Err(TaskError::ScriptFailed {
                exit_code: output.exit_code,
                stderr: output.stderr,
            })
        }
    }
}

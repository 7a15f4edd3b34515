//! Command-line and environment configuration

use clap::{ArgAction, Parser};
use jetsite_core::application::processor::constants::{
    DEFAULT_DRAIN_INTERVAL, DEFAULT_QUEUE_POLL_INTERVAL,
};
use jetsite_infra_github::{CredentialConfig, DEFAULT_API_URL};
use std::convert::Infallible;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SCRIPT: &str = "fork_template_repo_simple.ps1";
const DEFAULT_API_KEY: &str = "your-secret-api-key";

/// Jetsite Agent - creates GitHub repositories from templates on request
#[derive(Debug, Clone, Parser)]
#[command(name = "jetsite-agent", version, about)]
pub struct Config {
    /// HTTP port
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// HTTP bind host
    #[arg(long, env = "HOST", default_value = "localhost")]
    pub host: String,

    /// Directory new projects are created in (`~` is expanded)
    #[arg(short, long, env = "WORK_DIR", default_value = "./workspace")]
    pub work_dir: String,

    /// Template script (PowerShell path; the `.sh` sibling is used on Unix)
    #[arg(long, env = "JETSITE_SCRIPT", default_value = DEFAULT_SCRIPT)]
    pub script: String,

    /// Let the script open the project in the editor (anything but `false` enables it)
    #[arg(
        long,
        env = "AUTO_OPEN_VSCODE",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = parse_enabled
    )]
    pub auto_open_editor: bool,

    /// API key required on every route but /health
    #[arg(long, env = "API_KEY", default_value = DEFAULT_API_KEY, hide_env_values = true)]
    pub api_key: String,

    /// External queue endpoint
    #[arg(long, env = "QUEUE_URL")]
    pub queue_url: Option<String>,

    /// Task drain cadence in seconds
    #[arg(long, env = "POLL_INTERVAL", default_value_t = DEFAULT_DRAIN_INTERVAL.as_secs())]
    pub poll_interval: u64,

    /// External queue poll cadence in seconds
    #[arg(long, default_value_t = DEFAULT_QUEUE_POLL_INTERVAL.as_secs())]
    pub queue_poll_interval: u64,

    /// Disable external queue polling
    #[arg(long)]
    pub no_poll: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Directory for agent.log and agent-error.log
    #[arg(long, default_value = ".")]
    pub log_dir: PathBuf,

    /// Log to the console only
    #[arg(long)]
    pub no_log_files: bool,

    /// GitHub API root used to verify tokens
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub github_api_url: String,

    /// Prefix a token printed by `gh auth token` must carry
    #[arg(long, default_value = "gho_")]
    pub cli_token_prefix: String,

    #[arg(long, env = "GITHUB_TOKEN", hide = true, hide_env_values = true)]
    pub github_token: Option<String>,

    #[arg(long, env = "GH_TOKEN", hide = true, hide_env_values = true)]
    pub gh_token: Option<String>,
}

impl Config {
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.work_dir).into_owned())
    }

    pub fn script_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.script).into_owned())
    }

    pub fn drain_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval.max(1))
    }

    pub fn queue_poll_interval(&self) -> Duration {
        Duration::from_secs(self.queue_poll_interval.max(1))
    }

    /// Queue endpoint, unless polling is disabled
    pub fn queue_url(&self) -> Option<&str> {
        if self.no_poll {
            return None;
        }
        self.queue_url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Filter directive used when RUST_LOG is unset
    pub fn log_directive(&self) -> &str {
        if self.quiet {
            "warn"
        } else {
            &self.log_level
        }
    }

    pub fn credentials(&self) -> CredentialConfig {
        CredentialConfig {
            primary_token: self.github_token.clone(),
            secondary_token: self.gh_token.clone(),
            cli_token_prefix: self.cli_token_prefix.clone(),
            api_base_url: self.github_api_url.clone(),
            ..CredentialConfig::default()
        }
    }
}

fn parse_enabled(value: &str) -> Result<bool, Infallible> {
    Ok(value != "false")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["jetsite-agent"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_override() {
        let config = parse(&[
            "--port",
            "8080",
            "--host",
            "0.0.0.0",
            "--auto-open-editor",
            "false",
            "--poll-interval",
            "5",
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert!(!config.auto_open_editor);
        assert_eq!(config.drain_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_no_poll_disables_queue() {
        let config = parse(&["--queue-url", "http://queue.local/tasks", "--no-poll"]);
        assert_eq!(config.queue_url(), None);

        let config = parse(&["--queue-url", "http://queue.local/tasks"]);
        assert_eq!(config.queue_url(), Some("http://queue.local/tasks"));
    }

    #[test]
    fn test_quiet_lowers_level() {
        let config = parse(&["--quiet", "--log-level", "debug"]);
        assert_eq!(config.log_directive(), "warn");

        let config = parse(&["--log-level", "debug"]);
        assert_eq!(config.log_directive(), "debug");
    }

    #[test]
    fn test_work_dir_tilde_expanded() {
        let config = parse(&["--work-dir", "~/projects"]);
        assert!(!config.work_dir().to_string_lossy().starts_with('~'));
        assert!(config.work_dir().ends_with("projects"));
    }

    #[test]
    fn test_zero_interval_clamped() {
        let config = parse(&["--poll-interval", "0", "--queue-poll-interval", "0"]);
        assert_eq!(config.drain_interval(), Duration::from_secs(1));
        assert_eq!(config.queue_poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_credentials_carry_api_url() {
        let config = parse(&[
            "--github-api-url",
            "http://127.0.0.1:9/",
            "--github-token",
            "ghp_x",
        ]);
        let creds = config.credentials();
        assert_eq!(creds.api_base_url, "http://127.0.0.1:9/");
        assert_eq!(creds.primary_token.as_deref(), Some("ghp_x"));
        assert_eq!(creds.cli_program, "gh");
    }

    #[test]
    fn test_auto_open_disabled_only_by_false() {
        assert!(!parse(&["--auto-open-editor", "false"]).auto_open_editor);
        for value in ["true", "0", "1", "no", "FALSE"] {
            assert!(parse(&["--auto-open-editor", value]).auto_open_editor, "{}", value);
        }
    }
}

// GitHub Credential Resolver
// Precedence: primary env token -> secondary env token -> `gh auth token`

use crate::USER_AGENT;
use async_trait::async_trait;
use jetsite_core::port::CredentialProvider;
use reqwest::header::{AUTHORIZATION, USER_AGENT as USER_AGENT_HEADER};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

/// Public GitHub API root
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Where tokens come from and where they are checked
#[derive(Debug, Clone)]
pub struct CredentialConfig {
    /// `GITHUB_TOKEN`
    pub primary_token: Option<String>,
    /// `GH_TOKEN`
    pub secondary_token: Option<String>,
    pub cli_program: String,
    pub cli_args: Vec<String>,
    /// CLI output is only trusted when it starts with this prefix
    pub cli_token_prefix: String,
    pub api_base_url: String,
    pub verify_timeout: Duration,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            primary_token: None,
            secondary_token: None,
            cli_program: "gh".to_string(),
            cli_args: vec!["auth".to_string(), "token".to_string()],
            cli_token_prefix: "gho_".to_string(),
            api_base_url: DEFAULT_API_URL.to_string(),
            verify_timeout: Duration::from_secs(10),
        }
    }
}

impl CredentialConfig {
    /// Tokens read from `GITHUB_TOKEN` and `GH_TOKEN`
    pub fn from_env() -> Self {
        Self {
            primary_token: std::env::var("GITHUB_TOKEN").ok(),
            secondary_token: std::env::var("GH_TOKEN").ok(),
            ..Self::default()
        }
    }
}

pub struct GithubCredentials {
    config: CredentialConfig,
    client: reqwest::Client,
}

impl GithubCredentials {
    pub fn new(config: CredentialConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.verify_timeout)
            .build()?;
        Ok(Self { config, client })
    }

    async fn token_from_cli(&self) -> Option<String> {
        let output = match Command::new(&self.config.cli_program)
            .args(&self.config.cli_args)
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!(program = %self.config.cli_program, error = %e, "Could not get GitHub token from CLI");
                return None;
            }
        };

        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "GitHub CLI did not return a token");
            return None;
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() && token.starts_with(&self.config.cli_token_prefix) {
            info!("GitHub token obtained from CLI");
            Some(token)
        } else {
            warn!("GitHub CLI output is not a recognised token");
            None
        }
    }
}

fn non_empty(token: &Option<String>) -> Option<String> {
    token.as_deref().filter(|t| !t.trim().is_empty()).map(str::to_string)
}

#[async_trait]
impl CredentialProvider for GithubCredentials {
    async fn resolve_token(&self) -> Option<String> {
        if let Some(token) = non_empty(&self.config.primary_token) {
            debug!("Using GITHUB_TOKEN");
            return Some(token);
        }
        if let Some(token) = non_empty(&self.config.secondary_token) {
            debug!("Using GH_TOKEN");
            return Some(token);
        }
        self.token_from_cli().await
    }

    async fn verify(&self, token: &str) -> bool {
        let url = format!("{}/user", self.config.api_base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("token {}", token))
            .header(USER_AGENT_HEADER, USER_AGENT)
            .send()
            .await;

        match response {
            Ok(res) if res.status().is_success() => {
                info!("GitHub authentication verified");
                true
            }
            Ok(res) => {
                error!(status = res.status().as_u16(), "GitHub auth failed");
                false
            }
            Err(e) => {
                error!(error = %e, "GitHub auth error");
                false
            }
        }
    }
}

//! REST Request/Response Types

use jetsite_core::domain::{PostProcessingDirectives, Task, TaskPayload, DEFAULT_VISIBILITY};
use jetsite_core::port::StatusCounts;
use serde::{Deserialize, Serialize};

/// POST /create-repository
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepositoryRequest {
    pub template: Option<String>,
    pub name: Option<String>,
    pub visibility: Option<String>,
    #[serde(rename = "noVSCode")]
    pub no_vscode: Option<bool>,
    pub post_commands: Option<String>,
    pub post_processing: Option<PostProcessingDirectives>,
}

impl CreateRepositoryRequest {
    /// Apply creation-time defaults (blank visibility becomes public)
    pub fn into_payload(self) -> TaskPayload {
        let visibility = self
            .visibility
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VISIBILITY.to_string());

        TaskPayload {
            template: self.template.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            visibility,
            no_vscode: self.no_vscode.unwrap_or(false),
            post_commands: self.post_commands,
            post_processing: self.post_processing,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepositoryResponse {
    pub task_id: String,
    pub status: String,
    pub message: String,
}

/// GET /tasks query string
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<Task>,
    /// Unfiltered number of stored tasks
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub tasks: StatusCounts,
    pub agent: AgentStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    pub processing: bool,
    pub work_dir: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since startup
    pub uptime: f64,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let req: CreateRepositoryRequest =
            serde_json::from_str(r#"{"template":"react","name":"demo","visibility":""}"#).unwrap();
        let payload = req.into_payload();

        assert_eq!(payload.visibility, "public");
        assert!(!payload.no_vscode);
        assert_eq!(payload.post_commands, None);
    }

    #[test]
    fn test_optional_fields_carried() {
        let req: CreateRepositoryRequest = serde_json::from_str(
            r#"{"template":"t","name":"n","visibility":"private","noVSCode":true,
                "postCommands":"npm i","postProcessing":{"startServer":true}}"#,
        )
        .unwrap();
        let payload = req.into_payload();

        assert_eq!(payload.visibility, "private");
        assert!(payload.no_vscode);
        assert_eq!(payload.post_commands.as_deref(), Some("npm i"));
        let directives = payload.post_processing.unwrap();
        assert!(directives.start_server);
        assert!(directives.custom_commands.is_empty());
    }
}

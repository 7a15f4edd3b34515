//! HTTP Server
//!
//! Binds the REST router on a TCP address and serves it on a background task.

use crate::auth::{auth_disabled, require_api_key};
use crate::handler::{self, AppState};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const DEFAULT_HTTP_HOST: &str = "localhost";
const DEFAULT_HTTP_PORT: u16 = 3000;

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Every route; all but `/health` sit behind the API-key check
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/status", get(handler::status))
        .route("/create-repository", post(handler::create_repository))
        .route("/task/:task_id", get(handler::get_task))
        .route("/tasks", get(handler::list_tasks))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(handler::health))
        .merge(protected)
        .with_state(state)
}

/// Running server
pub struct ServerHandle {
    local_addr: SocketAddr,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait until the server stops
    pub async fn stopped(self) -> std::io::Result<()> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(std::io::Error::other(e)),
        }
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

pub struct ApiServer {
    config: HttpServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: HttpServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Bind and start serving.
    ///
    /// # Errors
    /// Returns the bind error when the address is unavailable
    pub async fn start(self) -> std::io::Result<ServerHandle> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;

        if auth_disabled(&self.state.api_key) {
            warn!("API key authentication disabled (development key configured)");
        }
        info!(address = %local_addr, "HTTP API listening");

        let app = router(self.state);
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app).await;
            if let Err(e) = &result {
                error!(error = %e, "HTTP server stopped");
            }
            result
        });

        Ok(ServerHandle { local_addr, task })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use jetsite_core::application::{
        PostProcessor, ScriptConfig, ScriptRunner, TaskOrchestrator, TaskProcessor,
    };
    use jetsite_core::port::command_runner::mocks::ScriptedCommandRunner;
    use jetsite_core::port::credential_provider::mocks::StaticCredentials;
    use jetsite_core::port::id_provider::mocks::SequentialIdProvider;
    use jetsite_core::port::time_provider::SystemTimeProvider;
    use jetsite_core::port::tool_probe::mocks::StaticToolProbe;
    use jetsite_core::port::TaskStore;
    use jetsite_infra_memory::InMemoryTaskStore;
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn state(api_key: &str) -> Arc<AppState> {
        let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new(
            Arc::new(SequentialIdProvider::new()),
            Arc::new(SystemTimeProvider),
        ));
        let runner = Arc::new(ScriptedCommandRunner::new());
        let script = ScriptRunner::new(
            ScriptConfig {
                script_path: PathBuf::from("fork.ps1"),
                work_dir: PathBuf::from("/work"),
                auto_open_editor: false,
            },
            Arc::new(StaticCredentials::valid("gho_abc")),
            runner.clone(),
        );
        let orchestrator = TaskOrchestrator::new(
            Arc::new(script),
            Arc::new(PostProcessor::new(runner)),
            Arc::new(StaticToolProbe::all_available()),
        );
        let processor = Arc::new(TaskProcessor::new(
            Arc::clone(&store),
            Arc::new(orchestrator),
        ));
        Arc::new(AppState::new(store, processor, PathBuf::from("/work"), api_key))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_repository_queues_task() {
        let state = state("dev-mode");
        let app = router(Arc::clone(&state));

        let (status, body) = send(
            app,
            post_json("/create-repository", json!({"template": "react", "name": "demo"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "queued");
        let id = body["taskId"].as_str().unwrap();
        let task = state.store.get(id).unwrap();
        assert_eq!(task.payload.visibility, "public");
    }

    #[tokio::test]
    async fn test_create_repository_missing_name_is_400() {
        let state = state("dev-mode");
        let (status, body) = send(
            router(Arc::clone(&state)),
            post_json("/create-repository", json!({"template": "react"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: template and name");
        assert_eq!(state.store.counts().total, 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let request = Request::builder()
            .method("POST")
            .uri("/create-repository")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(router(state("dev-mode")), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_task_is_404() {
        let (status, body) = send(router(state("dev-mode")), get("/task/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Task not found");
    }

    #[tokio::test]
    async fn test_get_task_returns_flattened_shape() {
        let state = state("dev-mode");
        let id = state
            .intake
            .submit(jetsite_core::domain::TaskPayload::new("react", "demo"))
            .unwrap();

        let (status, body) = send(router(state), get(&format!("/task/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id.as_str());
        assert_eq!(body["status"], "pending");
        assert_eq!(body["template"], "react");
        assert_eq!(body["noVSCode"], false);
        assert!(body.get("createdAt").is_some());
    }

    #[tokio::test]
    async fn test_list_tasks_filter_limit_and_total() {
        let state = state("dev-mode");
        for name in ["a", "b", "c"] {
            state
                .intake
                .submit(jetsite_core::domain::TaskPayload::new("react", name))
                .unwrap();
        }

        let (status, body) = send(
            router(Arc::clone(&state)),
            get("/tasks?status=pending&limit=2"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tasks"].as_array().unwrap().len(), 2);
        assert_eq!(body["total"], 3);

        let (status, body) = send(router(Arc::clone(&state)), get("/tasks?status=completed")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["tasks"].as_array().unwrap().is_empty());
        assert_eq!(body["total"], 3);
    }

    #[tokio::test]
    async fn test_list_tasks_unknown_status_is_400() {
        let (status, _) = send(router(state("dev-mode")), get("/tasks?status=bogus")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_status_reports_counts_and_agent() {
        let state = state("dev-mode");
        state
            .intake
            .submit(jetsite_core::domain::TaskPayload::new("react", "demo"))
            .unwrap();

        let (status, body) = send(router(state), get("/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tasks"]["pending"], 1);
        assert_eq!(body["tasks"]["total"], 1);
        assert_eq!(body["agent"]["processing"], false);
        assert_eq!(body["agent"]["workDir"], "/work");
    }

    #[tokio::test]
    async fn test_api_key_required_when_configured() {
        let state = state("s3cret");

        let (status, body) = send(router(Arc::clone(&state)), get("/status")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid API key");

        let request = Request::builder()
            .uri("/status")
            .header("X-API-Key", "s3cret")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(router(Arc::clone(&state)), request).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(router(Arc::clone(&state)), get("/tasks?apiKey=s3cret")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_is_never_authenticated() {
        let (status, body) = send(router(state("s3cret")), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_start_binds_ephemeral_port() {
        let server = ApiServer::new(
            HttpServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            state("dev-mode"),
        );
        let handle = server.start().await.unwrap();
        assert_ne!(handle.local_addr().port(), 0);
        handle.abort();
    }
}

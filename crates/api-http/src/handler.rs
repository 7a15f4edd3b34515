//! REST Route Handlers

use crate::error::ApiError;
use crate::types::{
    AgentStatus, CreateRepositoryRequest, CreateRepositoryResponse, HealthResponse,
    ListTasksQuery, ListTasksResponse, StatusResponse,
};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use jetsite_core::application::processor::constants::DEFAULT_LIST_LIMIT;
use jetsite_core::application::{TaskIntake, TaskProcessor};
use jetsite_core::domain::{Task, TaskStatus};
use jetsite_core::port::TaskStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

const QUEUED_MESSAGE: &str = "Repository creation task queued successfully";

/// Shared handler state
pub struct AppState {
    pub intake: Arc<TaskIntake>,
    pub store: Arc<dyn TaskStore>,
    pub processor: Arc<TaskProcessor>,
    pub work_dir: PathBuf,
    pub api_key: String,
    pub started: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TaskStore>,
        processor: Arc<TaskProcessor>,
        work_dir: PathBuf,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            intake: Arc::new(TaskIntake::new(Arc::clone(&store))),
            store,
            processor,
            work_dir,
            api_key: api_key.into(),
            started: Instant::now(),
        }
    }
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime: state.started.elapsed().as_secs_f64(),
        version: jetsite_core::VERSION,
    })
}

/// GET /status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        tasks: state.store.counts(),
        agent: AgentStatus {
            processing: state.processor.is_processing(),
            work_dir: state.work_dir.display().to_string(),
            uptime_seconds: state.started.elapsed().as_secs(),
        },
    })
}

/// POST /create-repository
pub async fn create_repository(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateRepositoryRequest>, JsonRejection>,
) -> Result<Json<CreateRepositoryResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let task_id = state.intake.submit(request.into_payload())?;

    Ok(Json(CreateRepositoryResponse {
        task_id,
        status: "queued".to_string(),
        message: QUEUED_MESSAGE.to_string(),
    }))
}

/// GET /task/:task_id
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    state
        .store
        .get(&task_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

/// GET /tasks?status=&limit=
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> Result<Json<ListTasksResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<TaskStatus>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    Ok(Json(ListTasksResponse {
        tasks: state.store.list(status, Some(limit)),
        total: state.store.counts().total,
    }))
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tally_model::{RegisterAgent, SubmitExpression, TaskId};

use crate::{error::ApiError, handler::ApiHandler};

/// Orchestrator HTTP surface builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: ApiHandler,
{
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - GET  /health
    /// - POST /api/v1/expressions - Submit expression
    /// - POST /api/v1/agents - Register agent
    /// - GET  /api/v1/agents - List agents
    /// - GET  /api/v1/agents/load - In-progress tasks per agent
    /// - GET  /api/v1/tasks - List tasks
    /// - GET  /api/v1/tasks/pending - Durations of unfinished tasks
    /// - GET  /api/v1/tasks/{id} - Retrieve task
    pub fn router(self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/api/v1/expressions", post(submit_expression::<H>))
            .route(
                "/api/v1/agents",
                post(register_agent::<H>).get(list_agents::<H>),
            )
            .route("/api/v1/agents/load", get(agent_load::<H>))
            .route("/api/v1/tasks", get(list_tasks::<H>))
            .route("/api/v1/tasks/pending", get(pending_durations::<H>))
            .route("/api/v1/tasks/{id}", get(retrieve_task::<H>))
            .with_state(self.handler)
    }
}

pub(crate) fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    raw.parse::<TaskId>()
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| ApiError::InvalidRequest(e.body_text()))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// POST /api/v1/expressions
async fn submit_expression<H>(
    State(handler): State<Arc<H>>,
    payload: Result<Json<SubmitExpression>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let req = body(payload)?;
    let task = handler.submit_expression(req.expression).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// POST /api/v1/agents
async fn register_agent<H>(
    State(handler): State<Arc<H>>,
    payload: Result<Json<RegisterAgent>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let req = body(payload)?;
    let agent = handler.register_agent(req.address).await?;

    Ok(Json(agent))
}

/// GET /api/v1/agents
async fn list_agents<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.list_agents().await?))
}

/// GET /api/v1/agents/load
async fn agent_load<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.agent_load().await?))
}

/// GET /api/v1/tasks
async fn list_tasks<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.list_tasks().await?))
}

/// GET /api/v1/tasks/pending
async fn pending_durations<H>(
    State(handler): State<Arc<H>>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.pending_durations().await?))
}

/// GET /api/v1/tasks/{id}
async fn retrieve_task<H>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let id = parse_task_id(&id)?;
    let task = handler.retrieve_task(id).await?;

    Ok(Json(task))
}

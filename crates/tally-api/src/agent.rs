use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post},
};
use tally_core::uptime_seconds;
use tally_exec::LocalSolver;
use tally_model::{Liveness, Task};
use tracing::debug;

use crate::error::ApiError;
use crate::http::{body, parse_task_id};

/// Agent HTTP surface builder.
pub struct AgentHttpApi {
    solver: LocalSolver,
}

impl AgentHttpApi {
    pub fn new(solver: LocalSolver) -> Self {
        Self { solver }
    }

    /// Routes:
    /// - GET  /api/v1/alive - Liveness
    /// - POST /api/v1/tasks - Placement
    /// - POST /api/v1/tasks/{id}/collect - Result retrieval
    pub fn router(self) -> Router {
        Router::new()
            .route("/api/v1/alive", get(alive))
            .route("/api/v1/tasks", post(place_task))
            .route("/api/v1/tasks/{id}/collect", post(collect_task))
            .with_state(self.solver)
    }
}

/// GET /api/v1/alive
async fn alive(State(solver): State<LocalSolver>) -> impl IntoResponse {
    Json(Liveness::alive(solver.agent_id(), uptime_seconds()))
}

/// POST /api/v1/tasks
async fn place_task(
    State(solver): State<LocalSolver>,
    payload: Result<Json<Task>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let task = body(payload)?;
    if task.id.0 == 0 {
        return Err(ApiError::InvalidRequest("task id must be positive".into()));
    }
    if task.is_terminal() {
        return Err(ApiError::InvalidRequest(format!(
            "task {} is already {}",
            task.id, task.status
        )));
    }
    debug!(task = %task.id, "placement offered");

    let accepted = solver.accept(task)?;
    Ok(Json(accepted))
}

/// POST /api/v1/tasks/{id}/collect
async fn collect_task(
    State(solver): State<LocalSolver>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_task_id(&id)?;
    let task = solver.collect(id)?;

    Ok(Json(task))
}

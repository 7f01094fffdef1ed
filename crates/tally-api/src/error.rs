use thiserror::Error;

use tally_core::CoreError;
use tally_exec::SolveError;
use tally_model::TaskId;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Solve(#[from] SolveError),
}

#[cfg(feature = "http")]
impl ApiError {
    fn status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TaskNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Core(e) => match e {
                CoreError::Invalid(_) => StatusCode::BAD_REQUEST,
                CoreError::TaskNotFound(_) => StatusCode::NOT_FOUND,
                CoreError::AtCapacity { .. } => StatusCode::SERVICE_UNAVAILABLE,
                CoreError::InvalidTransition { .. } | CoreError::NotQueued(_) => {
                    StatusCode::CONFLICT
                }
                CoreError::Supervisor(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Solve(e) => match e {
                SolveError::AtCapacity { .. } => StatusCode::SERVICE_UNAVAILABLE,
                SolveError::NotReady(_) => StatusCode::CONFLICT,
                SolveError::NotFound(_) => StatusCode::NOT_FOUND,
            },
        }
    }
}

#[cfg(feature = "http")]
impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() && status != axum::http::StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(all(test, feature = "http"))]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tally_model::ModelError;

    #[test]
    fn statuses_follow_the_contract() {
        assert_eq!(
            ApiError::InvalidRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CoreError::Invalid(ModelError::InvalidAddress("x".into()))).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CoreError::AtCapacity { limit: 1 }).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(SolveError::AtCapacity { limit: 2 }).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(SolveError::NotReady(TaskId(1))).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(SolveError::NotFound(TaskId(1))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::TaskNotFound(TaskId(3)).status(),
            StatusCode::NOT_FOUND
        );
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use skilltree_core::error::SkillError;

// ---------------------------------------------------------------------------
// AppError - unified error type for HTTP responses
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn join(err: tokio::task::JoinError) -> Self {
        Self(anyhow::anyhow!("task join error: {err}"))
    }
}

fn status_for(e: &SkillError) -> StatusCode {
    match e {
        SkillError::NotInitialized => StatusCode::BAD_REQUEST,
        SkillError::ContainerNotFound(_)
        | SkillError::SkillNotFound(_)
        | SkillError::DependencyNotFound(_) => StatusCode::NOT_FOUND,
        SkillError::NotOwner { .. } => StatusCode::FORBIDDEN,
        SkillError::LevelFull { .. }
        | SkillError::PositionTaken { .. }
        | SkillError::GuardRejected(_)
        | SkillError::Inconsistent { .. } => StatusCode::CONFLICT,
        SkillError::SubtreeTooDeep(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SkillError::InvalidLevel(_)
        | SkillError::InvalidKind(_)
        | SkillError::InvalidStatus(_)
        | SkillError::InvalidDirection(_) => StatusCode::BAD_REQUEST,
        SkillError::Db(_) | SkillError::Io(_) | SkillError::Yaml(_) | SkillError::Json(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self
            .0
            .downcast_ref::<SkillError>()
            .map(status_for)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

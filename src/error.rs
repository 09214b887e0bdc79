use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// RepoError
///
/// Failures surfaced by the data layer. `Database` wraps driver errors and is never
/// shown to callers verbatim.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
}

/// AppError
///
/// The HTTP-facing error taxonomy. Every handler returns `Result<_, AppError>` and the
/// `IntoResponse` impl renders `{ "success": false, "error": "..." }` with the matching status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal server error")]
    Storage(#[source] RepoError),
    // Failures of outside services (object storage). The detail is logged, not returned.
    #[error("Internal server error")]
    Upstream(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Storage(_) | Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(entity) => Self::NotFound(entity),
            RepoError::Conflict(message) => Self::Conflict(message),
            RepoError::Database(_) => {
                tracing::error!(error = ?err, "storage operation failed");
                Self::Storage(err)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Upstream(detail) = &self {
            tracing::error!(%detail, "upstream service call failed");
        }
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_hide_driver_detail() {
        let err = AppError::from(RepoError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn repo_not_found_maps_to_404() {
        let err = AppError::from(RepoError::NotFound("board"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "board not found");
    }
}

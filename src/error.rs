use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepoError;
use crate::domain::{FieldViolation, ValidationErrors};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        let message = err.to_string();
        match err {
            RepoError::NotFound(_) => AppError::NotFound("Item not found".to_string()),
            RepoError::Conflict { .. } => AppError::Conflict(message),
            RepoError::InvalidData(_) | RepoError::Storage(_) => AppError::Internal(message),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::Validation(err)
    }
}

impl From<FieldViolation> for AppError {
    fn from(violation: FieldViolation) -> Self {
        AppError::Validation(ValidationErrors::single(violation))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                json!("Internal server error")
            }
            AppError::NotFound(msg) | AppError::Conflict(msg) => json!(msg),
            AppError::Validation(errors) => json!(errors.violations()),
        };

        let body = Json(json!({
            "detail": detail,
            "status_code": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

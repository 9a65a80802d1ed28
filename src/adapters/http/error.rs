//! Mapping from application errors to HTTP responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::dto::ErrorResponse;
use crate::application::TaskboardError;
use crate::domain::foundation::ValidationError;

/// API error type that converts application errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub TaskboardError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TaskboardError::NotFound { .. } => StatusCode::NOT_FOUND,
            TaskboardError::Conflict { .. } => StatusCode::CONFLICT,
            TaskboardError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            TaskboardError::Unauthorized => StatusCode::UNAUTHORIZED,
            TaskboardError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TaskboardError> for ApiError {
    fn from(err: TaskboardError) -> Self {
        ApiError(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(TaskboardError::validation("body", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(TaskboardError::validation("query", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.0.code().to_string();
        let body = match &self.0 {
            TaskboardError::ValidationFailed { field, .. } => {
                ErrorResponse::new(code, self.0.message()).with_field(field)
            }
            TaskboardError::Infrastructure(detail) => {
                tracing::error!(error = %detail, "request failed");
                ErrorResponse::new(code, "Internal server error")
            }
            _ => ErrorResponse::new(code, self.0.message()),
        };

        (status, Json(body)).into_response()
    }
}

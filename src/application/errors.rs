//! Application-level error type returned by every handler.

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Outcome categories a caller can act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskboardError {
    /// Referenced task, board, or user does not exist.
    NotFound { code: ErrorCode, message: String },
    /// Version mismatch, stale order, or duplicate name. Retry after refetch.
    Conflict { code: ErrorCode, message: String },
    /// Malformed input, rejected before storage was touched.
    ValidationFailed { field: String, message: String },
    /// Login failed.
    Unauthorized,
    /// Storage or transport failure. The transaction was rolled back.
    Infrastructure(String),
}

impl TaskboardError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        TaskboardError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        TaskboardError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            TaskboardError::NotFound { code, .. } | TaskboardError::Conflict { code, .. } => *code,
            TaskboardError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            TaskboardError::Unauthorized => ErrorCode::Unauthorized,
            TaskboardError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            TaskboardError::NotFound { message, .. } | TaskboardError::Conflict { message, .. } => {
                message.clone()
            }
            TaskboardError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            TaskboardError::Unauthorized => "Invalid user name or password".to_string(),
            TaskboardError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for TaskboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for TaskboardError {}

impl From<DomainError> for TaskboardError {
    fn from(err: DomainError) -> Self {
        if err.code.is_not_found() {
            TaskboardError::NotFound {
                code: err.code,
                message: err.message,
            }
        } else if err.code.is_conflict() {
            TaskboardError::Conflict {
                code: err.code,
                message: err.message,
            }
        } else if err.code.is_validation() {
            let field = err
                .details
                .get("field")
                .cloned()
                .unwrap_or_else(|| "unknown".to_string());
            TaskboardError::ValidationFailed {
                field,
                message: err.message,
            }
        } else if err.code == ErrorCode::Unauthorized {
            TaskboardError::Unauthorized
        } else {
            TaskboardError::Infrastructure(err.message)
        }
    }
}

impl From<ValidationError> for TaskboardError {
    fn from(err: ValidationError) -> Self {
        TaskboardError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

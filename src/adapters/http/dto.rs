//! HTTP DTOs for the taskboard API.
//!
//! Bodies are camelCase JSON. Passwords deserialize straight into
//! [`SecretString`] and are never serialized back out.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::domain::board::Board;
use crate::domain::optimistic_lock::Versioned;
use crate::domain::task::Task;
use crate::domain::user::User;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub name: String,
    pub password: SecretString,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub password: SecretString,
    #[serde(default)]
    pub avatar: String,
}

/// A missing or blank password keeps the stored one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: String,
    #[serde(default)]
    pub password: Option<SecretString>,
    #[serde(default)]
    pub avatar: String,
    pub version: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    pub name: String,
    #[serde(default)]
    pub disp_order: Option<i32>,
    pub version: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignee_user_id: Option<String>,
    /// Defaults to the icebox.
    #[serde(default)]
    pub board_id: Option<String>,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default)]
    pub estimate_size: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignee_user_id: Option<String>,
    /// Must match the task's current board when present.
    #[serde(default)]
    pub board_id: Option<String>,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default)]
    pub estimate_size: i32,
    pub version: u32,
}

/// Body of `PUT /taskorders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTaskRequest {
    pub task_id: String,
    pub from_board_id: String,
    pub from_disp_order: i32,
    pub to_board_id: String,
    pub to_disp_order: i32,
}

/// `?version=N` on deletes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionQuery {
    pub version: Option<String>,
}

/// `?boardid=B` on task listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListQuery {
    pub boardid: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub assignee_user_id: Option<String>,
    pub board_id: String,
    pub disp_order: i32,
    pub created_at: String,
    pub is_closed: bool,
    pub estimate_size: i32,
    pub version: u32,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().to_string(),
            name: task.name().to_string(),
            description: task.description().to_string(),
            assignee_user_id: task.assignee().map(|u| u.to_string()),
            board_id: task.board_id().to_string(),
            disp_order: task.disp_order(),
            created_at: task.created_at().to_rfc3339(),
            is_closed: task.is_closed(),
            estimate_size: task.estimate_size(),
            version: task.version().as_u32(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    pub id: String,
    pub name: String,
    pub is_system: bool,
    pub disp_order: i32,
    pub version: u32,
}

impl From<&Board> for BoardResponse {
    fn from(board: &Board) -> Self {
        Self {
            id: board.id().to_string(),
            name: board.name().to_string(),
            is_system: board.is_system(),
            disp_order: board.disp_order(),
            version: board.version().as_u32(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub version: u32,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().to_string(),
            avatar: user.avatar().to_string(),
            version: user.version().as_u32(),
        }
    }
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_field(mut self, field: &str) -> Self {
        self.details = Some(serde_json::json!({ "field": field }));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn reorder_request_uses_camel_case() {
        let json = r#"{
            "taskId": "task_1",
            "fromBoardId": "todo",
            "fromDispOrder": 1,
            "toBoardId": "doing",
            "toDispOrder": 0
        }"#;
        let req: ReorderTaskRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.task_id, "task_1");
        assert_eq!(req.from_disp_order, 1);
        assert_eq!(req.to_board_id, "doing");
    }

    #[test]
    fn create_task_request_defaults_optional_fields() {
        let req: CreateTaskRequest = serde_json::from_str(r#"{"name": "Write"}"#).unwrap();
        assert_eq!(req.description, "");
        assert!(req.board_id.is_none());
        assert!(req.assignee_user_id.is_none());
        assert!(!req.is_closed);
        assert_eq!(req.estimate_size, 0);
    }

    #[test]
    fn update_user_password_is_optional() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"name": "alice", "version": 2}"#).unwrap();
        assert!(req.password.is_none());

        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"name": "alice", "password": "s3cret", "version": 2}"#)
                .unwrap();
        assert_eq!(req.password.unwrap().expose_secret(), "s3cret");
    }

    #[test]
    fn login_request_debug_hides_password() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"name": "alice", "password": "hunter2"}"#).unwrap();
        assert!(!format!("{:?}", req).contains("hunter2"));
    }

    #[test]
    fn error_response_omits_empty_details() {
        let json = serde_json::to_string(&ErrorResponse::new("TASK_NOT_FOUND", "gone")).unwrap();
        assert_eq!(json, r#"{"code":"TASK_NOT_FOUND","message":"gone"}"#);
    }
}

//! HTTP handlers for the taskboard endpoints.
//!
//! Each handler converts its DTO into an application command, runs the
//! matching application handler, and maps the result back to JSON.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::dto::{
    BoardResponse, CreateBoardRequest, CreateTaskRequest, CreateUserRequest, LoginRequest,
    ReorderTaskRequest, TaskListQuery, TaskResponse, UpdateBoardRequest, UpdateTaskRequest,
    UpdateUserRequest, UserResponse, VersionQuery,
};
use super::error::ApiError;
use super::extract::Origin;
use crate::adapters::websocket::WebSocketState;
use crate::application::handlers::{
    CreateBoardCommand, CreateBoardHandler, CreateTaskCommand, CreateTaskHandler,
    CreateUserCommand, CreateUserHandler, DeleteBoardCommand, DeleteBoardHandler,
    DeleteTaskCommand, DeleteTaskHandler, DeleteUserCommand, DeleteUserHandler, GetBoardHandler,
    GetTaskHandler, GetUserHandler, ListBoardsHandler, ListTasksHandler, ListUsersHandler,
    LoginCommand, LoginHandler, ReorderTaskCommand, ReorderTaskHandler, UpdateBoardCommand,
    UpdateBoardHandler, UpdateTaskCommand, UpdateTaskHandler, UpdateUserCommand,
    UpdateUserHandler,
};
use crate::application::MutationOrchestrator;
use crate::domain::foundation::{BoardId, TaskId, UserId, ValidationError, Version};
use crate::domain::ordering::TaskMove;
use crate::domain::task::TaskEdit;
use crate::ports::{PasswordHasher, TaskboardStore};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
#[derive(Clone)]
pub struct TaskboardAppState {
    pub orchestrator: Arc<MutationOrchestrator>,
    pub store: Arc<dyn TaskboardStore>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub websocket: WebSocketState,
}

impl TaskboardAppState {
    pub fn new(
        orchestrator: Arc<MutationOrchestrator>,
        store: Arc<dyn TaskboardStore>,
        hasher: Arc<dyn PasswordHasher>,
        websocket: WebSocketState,
    ) -> Self {
        Self {
            orchestrator,
            store,
            hasher,
            websocket,
        }
    }

    pub fn login_handler(&self) -> LoginHandler {
        LoginHandler::new(self.store.clone(), self.hasher.clone())
    }

    pub fn create_user_handler(&self) -> CreateUserHandler {
        CreateUserHandler::new(self.orchestrator.clone(), self.hasher.clone())
    }

    pub fn update_user_handler(&self) -> UpdateUserHandler {
        UpdateUserHandler::new(self.orchestrator.clone(), self.hasher.clone())
    }

    pub fn delete_user_handler(&self) -> DeleteUserHandler {
        DeleteUserHandler::new(self.orchestrator.clone())
    }

    pub fn create_board_handler(&self) -> CreateBoardHandler {
        CreateBoardHandler::new(self.orchestrator.clone())
    }

    pub fn update_board_handler(&self) -> UpdateBoardHandler {
        UpdateBoardHandler::new(self.orchestrator.clone())
    }

    pub fn delete_board_handler(&self) -> DeleteBoardHandler {
        DeleteBoardHandler::new(self.orchestrator.clone())
    }

    pub fn create_task_handler(&self) -> CreateTaskHandler {
        CreateTaskHandler::new(self.orchestrator.clone())
    }

    pub fn update_task_handler(&self) -> UpdateTaskHandler {
        UpdateTaskHandler::new(self.orchestrator.clone())
    }

    pub fn delete_task_handler(&self) -> DeleteTaskHandler {
        DeleteTaskHandler::new(self.orchestrator.clone())
    }

    pub fn reorder_task_handler(&self) -> ReorderTaskHandler {
        ReorderTaskHandler::new(self.orchestrator.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Input helpers
// ════════════════════════════════════════════════════════════════════════════════

fn task_id(raw: String) -> Result<TaskId, ApiError> {
    Ok(TaskId::new(raw)?)
}

fn board_id(raw: String) -> Result<BoardId, ApiError> {
    Ok(BoardId::new(raw)?)
}

fn user_id(raw: String) -> Result<UserId, ApiError> {
    Ok(UserId::new(raw)?)
}

fn optional_user_id(raw: Option<String>) -> Result<Option<UserId>, ApiError> {
    match raw.filter(|s| !s.trim().is_empty()) {
        Some(raw) => Ok(Some(user_id(raw)?)),
        None => Ok(None),
    }
}

fn optional_board_id(raw: Option<String>) -> Result<Option<BoardId>, ApiError> {
    match raw.filter(|s| !s.trim().is_empty()) {
        Some(raw) => Ok(Some(board_id(raw)?)),
        None => Ok(None),
    }
}

/// Parses `?version=N`, which every delete requires.
fn required_version(
    query: Result<Query<VersionQuery>, QueryRejection>,
) -> Result<Version, ApiError> {
    let Query(query) = query?;
    let raw = query
        .version
        .ok_or_else(|| ValidationError::empty_field("version"))?;
    let version = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| {
            ValidationError::invalid_format("version", "expected a non-negative integer")
        })?;
    Ok(Version::from_raw(version))
}

// ════════════════════════════════════════════════════════════════════════════════
// Users
// ════════════════════════════════════════════════════════════════════════════════

/// POST /taskboard/login
pub async fn login(
    State(state): State<TaskboardAppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let user = state
        .login_handler()
        .handle(LoginCommand {
            name: request.name,
            password: request.password,
        })
        .await?;
    Ok(Json(UserResponse::from(&user)))
}

/// GET /taskboard/users
pub async fn list_users(
    State(state): State<TaskboardAppState>,
) -> Result<impl IntoResponse, ApiError> {
    let users = ListUsersHandler::new(state.store.clone()).handle().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect::<Vec<_>>()))
}

/// GET /taskboard/users/:id
pub async fn get_user(
    State(state): State<TaskboardAppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = user_id(id)?;
    let user = GetUserHandler::new(state.store.clone()).handle(&id).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// POST /taskboard/users
pub async fn create_user(
    State(state): State<TaskboardAppState>,
    origin: Origin,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let cmd = CreateUserCommand {
        name: request.name,
        password: request.password,
        avatar: request.avatar,
    };
    let user = state.create_user_handler().handle(cmd, origin.identity()).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// PUT /taskboard/users/:id
pub async fn update_user(
    State(state): State<TaskboardAppState>,
    Path(id): Path<String>,
    origin: Origin,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let cmd = UpdateUserCommand {
        user_id: user_id(id)?,
        name: request.name,
        password: request.password,
        avatar: request.avatar,
        version: Version::from_raw(request.version),
    };
    let user = state.update_user_handler().handle(cmd, origin.identity()).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /taskboard/users/:id?version=N
pub async fn delete_user(
    State(state): State<TaskboardAppState>,
    Path(id): Path<String>,
    origin: Origin,
    query: Result<Query<VersionQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = DeleteUserCommand {
        user_id: user_id(id)?,
        version: required_version(query)?,
    };
    state.delete_user_handler().handle(cmd, origin.identity()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Boards
// ════════════════════════════════════════════════════════════════════════════════

/// GET /taskboard/boards
pub async fn list_boards(
    State(state): State<TaskboardAppState>,
) -> Result<impl IntoResponse, ApiError> {
    let boards = ListBoardsHandler::new(state.store.clone()).handle().await?;
    Ok(Json(boards.iter().map(BoardResponse::from).collect::<Vec<_>>()))
}

/// GET /taskboard/boards/:id
pub async fn get_board(
    State(state): State<TaskboardAppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = board_id(id)?;
    let board = GetBoardHandler::new(state.store.clone()).handle(&id).await?;
    Ok(Json(BoardResponse::from(&board)))
}

/// POST /taskboard/boards
pub async fn create_board(
    State(state): State<TaskboardAppState>,
    origin: Origin,
    body: Result<Json<CreateBoardRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let board = state
        .create_board_handler()
        .handle(CreateBoardCommand { name: request.name }, origin.identity())
        .await?;
    Ok((StatusCode::CREATED, Json(BoardResponse::from(&board))))
}

/// PUT /taskboard/boards/:id
pub async fn update_board(
    State(state): State<TaskboardAppState>,
    Path(id): Path<String>,
    origin: Origin,
    body: Result<Json<UpdateBoardRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let cmd = UpdateBoardCommand {
        board_id: board_id(id)?,
        name: request.name,
        disp_order: request.disp_order,
        version: Version::from_raw(request.version),
    };
    let board = state.update_board_handler().handle(cmd, origin.identity()).await?;
    Ok(Json(BoardResponse::from(&board)))
}

/// DELETE /taskboard/boards/:id?version=N
pub async fn delete_board(
    State(state): State<TaskboardAppState>,
    Path(id): Path<String>,
    origin: Origin,
    query: Result<Query<VersionQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = DeleteBoardCommand {
        board_id: board_id(id)?,
        version: required_version(query)?,
    };
    state.delete_board_handler().handle(cmd, origin.identity()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Tasks
// ════════════════════════════════════════════════════════════════════════════════

/// GET /taskboard/tasks[?boardid=B]
pub async fn list_tasks(
    State(state): State<TaskboardAppState>,
    query: Result<Query<TaskListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let board = optional_board_id(query.boardid)?;
    let tasks = ListTasksHandler::new(state.store.clone())
        .handle(board.as_ref())
        .await?;
    Ok(Json(tasks.iter().map(TaskResponse::from).collect::<Vec<_>>()))
}

/// GET /taskboard/tasks/:id
pub async fn get_task(
    State(state): State<TaskboardAppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = task_id(id)?;
    let task = GetTaskHandler::new(state.store.clone()).handle(&id).await?;
    Ok(Json(TaskResponse::from(&task)))
}

/// POST /taskboard/tasks
pub async fn create_task(
    State(state): State<TaskboardAppState>,
    origin: Origin,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let cmd = CreateTaskCommand {
        edit: TaskEdit {
            name: request.name,
            description: request.description,
            assignee: optional_user_id(request.assignee_user_id)?,
            is_closed: request.is_closed,
            estimate_size: request.estimate_size,
        },
        board_id: optional_board_id(request.board_id)?,
    };
    let task = state.create_task_handler().handle(cmd, origin.identity()).await?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(&task))))
}

/// PUT /taskboard/tasks/:id
pub async fn update_task(
    State(state): State<TaskboardAppState>,
    Path(id): Path<String>,
    origin: Origin,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let cmd = UpdateTaskCommand {
        task_id: task_id(id)?,
        edit: TaskEdit {
            name: request.name,
            description: request.description,
            assignee: optional_user_id(request.assignee_user_id)?,
            is_closed: request.is_closed,
            estimate_size: request.estimate_size,
        },
        board_id: optional_board_id(request.board_id)?,
        version: Version::from_raw(request.version),
    };
    let task = state.update_task_handler().handle(cmd, origin.identity()).await?;
    Ok(Json(TaskResponse::from(&task)))
}

/// DELETE /taskboard/tasks/:id?version=N
pub async fn delete_task(
    State(state): State<TaskboardAppState>,
    Path(id): Path<String>,
    origin: Origin,
    query: Result<Query<VersionQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = DeleteTaskCommand {
        task_id: task_id(id)?,
        version: required_version(query)?,
    };
    state.delete_task_handler().handle(cmd, origin.identity()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /taskboard/taskorders
pub async fn reorder_task(
    State(state): State<TaskboardAppState>,
    origin: Origin,
    body: Result<Json<ReorderTaskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let cmd = ReorderTaskCommand {
        request: TaskMove {
            task_id: task_id(request.task_id)?,
            from_board: board_id(request.from_board_id)?,
            from_disp_order: request.from_disp_order,
            to_board: board_id(request.to_board_id)?,
            to_disp_order: request.to_disp_order,
        },
    };
    let task = state.reorder_task_handler().handle(cmd, origin.identity()).await?;
    Ok(Json(TaskResponse::from(&task)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_version_rejects_missing_and_garbage() {
        let missing: Result<Query<VersionQuery>, QueryRejection> =
            Ok(Query(VersionQuery::default()));
        assert!(required_version(missing).is_err());

        let garbage = Ok(Query(VersionQuery {
            version: Some("two".to_string()),
        }));
        assert!(required_version(garbage).is_err());

        let good = Ok(Query(VersionQuery {
            version: Some("3".to_string()),
        }));
        assert_eq!(required_version(good).unwrap(), Version::from_raw(3));
    }

    #[test]
    fn blank_optional_ids_are_absent() {
        assert!(optional_board_id(Some("  ".to_string())).unwrap().is_none());
        assert!(optional_user_id(None).unwrap().is_none());
        assert_eq!(
            optional_board_id(Some("todo".to_string())).unwrap(),
            Some(BoardId::new("todo").unwrap())
        );
    }
}

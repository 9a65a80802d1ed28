//! Lookups that turn a missing row into the matching not-found error.

use crate::domain::board::Board;
use crate::domain::foundation::{BoardId, DomainError, ErrorCode, TaskId, UserId};
use crate::domain::task::Task;
use crate::domain::user::User;
use crate::ports::StoreTransaction;

pub(crate) fn task_not_found(id: &TaskId) -> DomainError {
    DomainError::new(ErrorCode::TaskNotFound, format!("Task not found: {}", id))
        .with_detail("taskId", id.as_str())
}

pub(crate) fn board_not_found(id: &BoardId) -> DomainError {
    DomainError::new(ErrorCode::BoardNotFound, format!("Board not found: {}", id))
        .with_detail("boardId", id.as_str())
}

pub(crate) fn user_not_found(id: &UserId) -> DomainError {
    DomainError::new(ErrorCode::UserNotFound, format!("User not found: {}", id))
        .with_detail("userId", id.as_str())
}

pub(crate) async fn task(tx: &mut dyn StoreTransaction, id: &TaskId) -> Result<Task, DomainError> {
    tx.find_task(id).await?.ok_or_else(|| task_not_found(id))
}

pub(crate) async fn board(
    tx: &mut dyn StoreTransaction,
    id: &BoardId,
) -> Result<Board, DomainError> {
    tx.find_board(id).await?.ok_or_else(|| board_not_found(id))
}

pub(crate) async fn user(tx: &mut dyn StoreTransaction, id: &UserId) -> Result<User, DomainError> {
    tx.find_user(id).await?.ok_or_else(|| user_not_found(id))
}

//! Taskboard persistence port.
//!
//! The store hands out transactions. Every mutation runs inside exactly one
//! [`StoreTransaction`]; nothing is visible to other readers until
//! [`StoreTransaction::commit`] returns `Ok`. Dropping a transaction without
//! committing discards it.
//!
//! # Locking contract
//!
//! - Rows read through a transaction are locked against concurrent writers
//!   until the transaction ends.
//! - Versioned writes (`update_*`, `delete_*`) take the version the row held
//!   when it was read and fail with `VersionConflict` if it changed, so two
//!   racing writers cannot both win.
//! - Position writes (`set_*_orders`) are unversioned: they only move rows
//!   the ordering engine already accounted for.
//! - Mutations that change a board's task order lock the board row first,
//!   then its task list; when two boards are involved, both in id order.

use async_trait::async_trait;

use crate::domain::board::Board;
use crate::domain::foundation::{BoardId, DomainError, TaskId, UserId, Version};
use crate::domain::ordering::Slot;
use crate::domain::task::Task;
use crate::domain::user::User;

/// One unit of work against the taskboard store.
#[async_trait]
pub trait StoreTransaction: Send {
    // ─── Tasks ───────────────────────────────────────────────────────────

    /// Load and lock a task.
    async fn find_task(&mut self, id: &TaskId) -> Result<Option<Task>, DomainError>;

    /// The board a task is on, read without taking a lock.
    async fn locate_task(&mut self, id: &TaskId) -> Result<Option<BoardId>, DomainError>;

    /// Load and lock every task on a board, ordered by `disp_order`.
    async fn tasks_on_board(&mut self, board_id: &BoardId) -> Result<Vec<Task>, DomainError>;

    /// Load and lock every task assigned to a user.
    async fn tasks_assigned_to(&mut self, user_id: &UserId) -> Result<Vec<Task>, DomainError>;

    async fn insert_task(&mut self, task: &Task) -> Result<(), DomainError>;

    /// Write all task fields.
    ///
    /// # Errors
    ///
    /// - `TaskNotFound` if the row is gone
    /// - `VersionConflict` if the stored version is not `expected`
    async fn update_task(&mut self, task: &Task, expected: Version) -> Result<(), DomainError>;

    /// Overwrite `disp_order` for the listed tasks.
    async fn set_task_orders(&mut self, orders: &[Slot<TaskId>]) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `TaskNotFound` if the row is gone
    /// - `VersionConflict` if the stored version is not `expected`
    async fn delete_task(&mut self, id: &TaskId, expected: Version) -> Result<(), DomainError>;

    // ─── Boards ──────────────────────────────────────────────────────────

    async fn find_board(&mut self, id: &BoardId) -> Result<Option<Board>, DomainError>;

    /// Load and lock every board, ordered by `disp_order`.
    async fn boards(&mut self) -> Result<Vec<Board>, DomainError>;

    async fn insert_board(&mut self, board: &Board) -> Result<(), DomainError>;

    async fn update_board(&mut self, board: &Board, expected: Version) -> Result<(), DomainError>;

    async fn set_board_orders(&mut self, orders: &[Slot<BoardId>]) -> Result<(), DomainError>;

    async fn delete_board(&mut self, id: &BoardId, expected: Version) -> Result<(), DomainError>;

    // ─── Users ───────────────────────────────────────────────────────────

    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, DomainError>;

    async fn find_user_by_name(&mut self, name: &str) -> Result<Option<User>, DomainError>;

    /// # Errors
    ///
    /// - `DuplicateName` if another user already has this name
    async fn insert_user(&mut self, user: &User) -> Result<(), DomainError>;

    async fn update_user(&mut self, user: &User, expected: Version) -> Result<(), DomainError>;

    async fn delete_user(&mut self, id: &UserId, expected: Version) -> Result<(), DomainError>;

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Make every write of this transaction durable and visible.
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    /// Discard every write of this transaction.
    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}

/// Taskboard persistence.
///
/// Read methods run outside any transaction and see committed state only.
#[async_trait]
pub trait TaskboardStore: Send + Sync {
    /// Start a transaction.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, DomainError>;

    /// Tasks, optionally filtered by board, ordered by
    /// `disp_order, created_at, name`.
    async fn list_tasks(&self, board_id: Option<&BoardId>) -> Result<Vec<Task>, DomainError>;

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>, DomainError>;

    /// Boards ordered by `disp_order`.
    async fn list_boards(&self) -> Result<Vec<Board>, DomainError>;

    async fn get_board(&self, id: &BoardId) -> Result<Option<Board>, DomainError>;

    /// Users ordered by name.
    async fn list_users(&self) -> Result<Vec<User>, DomainError>;

    async fn get_user(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    async fn get_user_by_name(&self, name: &str) -> Result<Option<User>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn store_ports_are_object_safe() {
        fn _accepts_store(_store: &dyn TaskboardStore) {}
        fn _accepts_tx(_tx: Box<dyn StoreTransaction>) {}
    }
}

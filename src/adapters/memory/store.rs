//! In-Memory Taskboard Store
//!
//! Keeps tasks, boards, and users in memory. A transaction holds the store
//! lock for its whole lifetime and works on a private copy, so writers are
//! fully serialized and an abandoned transaction leaves no trace.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::board::{Board, SYSTEM_BOARDS};
use crate::domain::foundation::{BoardId, DomainError, ErrorCode, TaskId, UserId, Version};
use crate::domain::optimistic_lock::{self, Versioned};
use crate::domain::ordering::Slot;
use crate::domain::task::Task;
use crate::domain::user::User;
use crate::ports::{StoreTransaction, TaskboardStore};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    tasks: HashMap<TaskId, Task>,
    boards: HashMap<BoardId, Board>,
    users: HashMap<UserId, User>,
}

impl MemoryState {
    fn tasks_sorted(&self, filter: impl Fn(&Task) -> bool) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.values().filter(|&t| filter(t)).cloned().collect();
        tasks.sort_by(|a, b| {
            a.disp_order()
                .cmp(&b.disp_order())
                .then_with(|| a.created_at().cmp(b.created_at()))
                .then_with(|| a.name().cmp(b.name()))
        });
        tasks
    }

    fn boards_sorted(&self) -> Vec<Board> {
        let mut boards: Vec<Board> = self.boards.values().cloned().collect();
        boards.sort_by(|a, b| {
            a.disp_order()
                .cmp(&b.disp_order())
                .then_with(|| a.name().cmp(b.name()))
        });
        boards
    }

    fn user_by_name(&self, name: &str) -> Option<User> {
        self.users.values().find(|u| u.name() == name).cloned()
    }
}

/// In-memory implementation of [`TaskboardStore`].
#[derive(Debug, Clone)]
pub struct InMemoryTaskboardStore {
    state: Arc<Mutex<MemoryState>>,
    fail_next_commit: Arc<StdMutex<Option<DomainError>>>,
}

impl InMemoryTaskboardStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            fail_next_commit: Arc::default(),
        }
    }

    /// Create a store holding the four system boards.
    pub fn with_system_boards() -> Self {
        let mut state = MemoryState::default();
        for system in SYSTEM_BOARDS.iter() {
            let board = system.to_board();
            state.boards.insert(board.id().clone(), board);
        }
        Self {
            state: Arc::new(Mutex::new(state)),
            fail_next_commit: Arc::default(),
        }
    }

    /// Make the next commit fail as if storage went away (useful for tests).
    pub fn fail_next_commit(&self) {
        self.fail_next_commit_with(DomainError::database(
            "commit failed",
            "simulated storage failure",
        ));
    }

    /// Make the next commit fail with `err`.
    pub fn fail_next_commit_with(&self, err: DomainError) {
        *self
            .fail_next_commit
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(err);
    }

    /// Number of stored tasks.
    pub async fn task_count(&self) -> usize {
        self.state.lock().await.tasks.len()
    }
}

impl Default for InMemoryTaskboardStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskboardStore for InMemoryTaskboardStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, DomainError> {
        let guard = self.state.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryTransaction {
            guard,
            working,
            fail_commit: self
                .fail_next_commit
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        }))
    }

    async fn list_tasks(&self, board_id: Option<&BoardId>) -> Result<Vec<Task>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.tasks_sorted(|t| board_id.map_or(true, |b| t.board_id() == b)))
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>, DomainError> {
        Ok(self.state.lock().await.tasks.get(id).cloned())
    }

    async fn list_boards(&self) -> Result<Vec<Board>, DomainError> {
        Ok(self.state.lock().await.boards_sorted())
    }

    async fn get_board(&self, id: &BoardId) -> Result<Option<Board>, DomainError> {
        Ok(self.state.lock().await.boards.get(id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let mut users: Vec<User> = self.state.lock().await.users.values().cloned().collect();
        users.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(users)
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.state.lock().await.users.get(id).cloned())
    }

    async fn get_user_by_name(&self, name: &str) -> Result<Option<User>, DomainError> {
        Ok(self.state.lock().await.user_by_name(name))
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    fail_commit: Option<DomainError>,
}

fn missing(code: ErrorCode, kind: &str, id: &str) -> DomainError {
    DomainError::new(code, format!("{} not found: {}", kind, id))
}

/// Compares the stored row's version with the caller's read version.
fn guard_version<T: Versioned>(
    stored: Option<&T>,
    code: ErrorCode,
    id: &str,
    expected: Version,
) -> Result<(), DomainError> {
    let stored = stored.ok_or_else(|| missing(code, T::KIND, id))?;
    optimistic_lock::check(stored, expected)?;
    Ok(())
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn find_task(&mut self, id: &TaskId) -> Result<Option<Task>, DomainError> {
        Ok(self.working.tasks.get(id).cloned())
    }

    async fn locate_task(&mut self, id: &TaskId) -> Result<Option<BoardId>, DomainError> {
        Ok(self.working.tasks.get(id).map(|t| t.board_id().clone()))
    }

    async fn tasks_on_board(&mut self, board_id: &BoardId) -> Result<Vec<Task>, DomainError> {
        Ok(self.working.tasks_sorted(|t| t.board_id() == board_id))
    }

    async fn tasks_assigned_to(&mut self, user_id: &UserId) -> Result<Vec<Task>, DomainError> {
        Ok(self.working.tasks_sorted(|t| t.assignee() == Some(user_id)))
    }

    async fn insert_task(&mut self, task: &Task) -> Result<(), DomainError> {
        self.working.tasks.insert(task.id().clone(), task.clone());
        Ok(())
    }

    async fn update_task(&mut self, task: &Task, expected: Version) -> Result<(), DomainError> {
        guard_version(
            self.working.tasks.get(task.id()),
            ErrorCode::TaskNotFound,
            task.id().as_str(),
            expected,
        )?;
        self.working.tasks.insert(task.id().clone(), task.clone());
        Ok(())
    }

    async fn set_task_orders(&mut self, orders: &[Slot<TaskId>]) -> Result<(), DomainError> {
        for slot in orders {
            let task = self
                .working
                .tasks
                .get_mut(&slot.key)
                .ok_or_else(|| missing(ErrorCode::TaskNotFound, "Task", slot.key.as_str()))?;
            let board_id = task.board_id().clone();
            task.place(board_id, slot.disp_order);
        }
        Ok(())
    }

    async fn delete_task(&mut self, id: &TaskId, expected: Version) -> Result<(), DomainError> {
        guard_version(self.working.tasks.get(id), ErrorCode::TaskNotFound, id.as_str(), expected)?;
        self.working.tasks.remove(id);
        Ok(())
    }

    async fn find_board(&mut self, id: &BoardId) -> Result<Option<Board>, DomainError> {
        Ok(self.working.boards.get(id).cloned())
    }

    async fn boards(&mut self) -> Result<Vec<Board>, DomainError> {
        Ok(self.working.boards_sorted())
    }

    async fn insert_board(&mut self, board: &Board) -> Result<(), DomainError> {
        self.working.boards.insert(board.id().clone(), board.clone());
        Ok(())
    }

    async fn update_board(&mut self, board: &Board, expected: Version) -> Result<(), DomainError> {
        guard_version(
            self.working.boards.get(board.id()),
            ErrorCode::BoardNotFound,
            board.id().as_str(),
            expected,
        )?;
        self.working.boards.insert(board.id().clone(), board.clone());
        Ok(())
    }

    async fn set_board_orders(&mut self, orders: &[Slot<BoardId>]) -> Result<(), DomainError> {
        for slot in orders {
            let board = self
                .working
                .boards
                .get_mut(&slot.key)
                .ok_or_else(|| missing(ErrorCode::BoardNotFound, "Board", slot.key.as_str()))?;
            board.set_disp_order(slot.disp_order);
        }
        Ok(())
    }

    async fn delete_board(&mut self, id: &BoardId, expected: Version) -> Result<(), DomainError> {
        guard_version(
            self.working.boards.get(id),
            ErrorCode::BoardNotFound,
            id.as_str(),
            expected,
        )?;
        self.working.boards.remove(id);
        Ok(())
    }

    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.working.users.get(id).cloned())
    }

    async fn find_user_by_name(&mut self, name: &str) -> Result<Option<User>, DomainError> {
        Ok(self.working.user_by_name(name))
    }

    async fn insert_user(&mut self, user: &User) -> Result<(), DomainError> {
        if self.working.user_by_name(user.name()).is_some() {
            return Err(DomainError::new(
                ErrorCode::DuplicateName,
                format!("User name already taken: {}", user.name()),
            ));
        }
        self.working.users.insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn update_user(&mut self, user: &User, expected: Version) -> Result<(), DomainError> {
        guard_version(
            self.working.users.get(user.id()),
            ErrorCode::UserNotFound,
            user.id().as_str(),
            expected,
        )?;
        if let Some(other) = self.working.user_by_name(user.name()) {
            if other.id() != user.id() {
                return Err(DomainError::new(
                    ErrorCode::DuplicateName,
                    format!("User name already taken: {}", user.name()),
                ));
            }
        }
        self.working.users.insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn delete_user(&mut self, id: &UserId, expected: Version) -> Result<(), DomainError> {
        guard_version(self.working.users.get(id), ErrorCode::UserNotFound, id.as_str(), expected)?;
        self.working.users.remove(id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let MemoryTransaction {
            mut guard,
            working,
            fail_commit,
        } = *self;
        if let Some(err) = fail_commit {
            return Err(err);
        }
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::SystemBoard;
    use crate::domain::task::TaskEdit;

    fn task(name: &str, board: BoardId, order: i32) -> Task {
        let edit = TaskEdit {
            name: name.to_string(),
            description: String::new(),
            assignee: None,
            is_closed: false,
            estimate_size: 0,
        };
        Task::new(TaskId::generate(), edit, board, order).unwrap()
    }

    #[tokio::test]
    async fn system_boards_are_seeded_in_order() {
        let store = InMemoryTaskboardStore::with_system_boards();
        let names: Vec<String> = store
            .list_boards()
            .await
            .unwrap()
            .iter()
            .map(|b| b.name().to_string())
            .collect();
        assert_eq!(names, vec!["Icebox", "Todo", "Doing", "Done"]);
    }

    #[tokio::test]
    async fn uncommitted_writes_are_invisible() {
        let store = InMemoryTaskboardStore::with_system_boards();
        let mut tx = store.begin().await.unwrap();
        tx.insert_task(&task("A", SystemBoard::icebox(), 0)).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(store.task_count().await, 0);
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let store = InMemoryTaskboardStore::with_system_boards();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_task(&task("A", SystemBoard::icebox(), 0)).await.unwrap();
        }
        assert_eq!(store.task_count().await, 0);
    }

    #[tokio::test]
    async fn committed_writes_are_visible() {
        let store = InMemoryTaskboardStore::with_system_boards();
        let mut tx = store.begin().await.unwrap();
        tx.insert_task(&task("A", SystemBoard::icebox(), 0)).await.unwrap();
        tx.commit().await.unwrap();

        let tasks = store.list_tasks(Some(&SystemBoard::icebox())).await.unwrap();
        assert_eq!(tasks.len(), 1);
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let store = InMemoryTaskboardStore::with_system_boards();
        let t = task("A", SystemBoard::icebox(), 0);
        let mut tx = store.begin().await.unwrap();
        tx.insert_task(&t).await.unwrap();

        let err = tx.update_task(&t, Version::from_raw(7)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::VersionConflict);

        let err = tx
            .delete_task(&TaskId::generate(), Version::INITIAL)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TaskNotFound);
    }

    #[tokio::test]
    async fn list_orders_by_position_then_creation() {
        let store = InMemoryTaskboardStore::with_system_boards();
        let mut tx = store.begin().await.unwrap();
        tx.insert_task(&task("second", SystemBoard::icebox(), 1)).await.unwrap();
        tx.insert_task(&task("first", SystemBoard::icebox(), 0)).await.unwrap();
        tx.commit().await.unwrap();

        let names: Vec<String> = store
            .list_tasks(None)
            .await
            .unwrap()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}

//! Shared fixtures for handler tests.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::adapters::memory::InMemoryTaskboardStore;
use crate::application::orchestrator::tests::RecordingNotifier;
use crate::application::orchestrator::MutationOrchestrator;
use crate::domain::board::Board;
use crate::domain::foundation::{BoardId, DomainError, TaskId, UserId, Version};
use crate::domain::ordering::Slot;
use crate::domain::task::{Task, TaskEdit};
use crate::domain::user::{PasswordHash, User};
use crate::ports::{PasswordHasher, StoreTransaction, TaskboardStore};

use super::task::{CreateTaskCommand, CreateTaskHandler};
use super::user::{CreateUserCommand, CreateUserHandler};

/// Reversible stand-in for bcrypt.
pub(crate) struct PlainHasher;

#[async_trait]
impl PasswordHasher for PlainHasher {
    async fn hash(&self, password: &SecretString) -> Result<PasswordHash, DomainError> {
        Ok(PasswordHash::new(format!("plain:{}", password.expose_secret())))
    }

    async fn verify(
        &self,
        password: &SecretString,
        hash: &PasswordHash,
    ) -> Result<bool, DomainError> {
        Ok(hash.as_str() == format!("plain:{}", password.expose_secret()))
    }
}

pub(crate) struct Fixture {
    pub store: Arc<InMemoryTaskboardStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub orchestrator: Arc<MutationOrchestrator>,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryTaskboardStore::with_system_boards());
        let notifier = Arc::new(RecordingNotifier::default());
        let orchestrator = Arc::new(MutationOrchestrator::new(store.clone(), notifier.clone()));
        Self {
            store,
            notifier,
            orchestrator,
        }
    }

    pub fn board(id: &str) -> BoardId {
        BoardId::new(id).unwrap()
    }

    pub fn edit(name: &str) -> TaskEdit {
        TaskEdit {
            name: name.to_string(),
            description: String::new(),
            assignee: None,
            is_closed: false,
            estimate_size: 1,
        }
    }

    /// Appends a task to `board`.
    pub async fn add_task(&self, name: &str, board: &str) -> Task {
        CreateTaskHandler::new(self.orchestrator.clone())
            .handle(
                CreateTaskCommand {
                    edit: Self::edit(name),
                    board_id: Some(Self::board(board)),
                },
                None,
            )
            .await
            .unwrap()
    }

    /// Registers a user whose password is `password`.
    pub async fn add_user(&self, name: &str) -> User {
        CreateUserHandler::new(self.orchestrator.clone(), Arc::new(PlainHasher))
            .handle(
                CreateUserCommand {
                    name: name.to_string(),
                    password: SecretString::new("password".to_string()),
                    avatar: String::new(),
                },
                None,
            )
            .await
            .unwrap()
    }

    /// `(name, disp_order)` for every task on `board`, in order.
    pub async fn layout(&self, board: &str) -> Vec<(String, i32)> {
        self.store
            .list_tasks(Some(&Self::board(board)))
            .await
            .unwrap()
            .iter()
            .map(|t| (t.name().to_string(), t.disp_order()))
            .collect()
    }

    /// Expected layout literal for comparisons with [`Fixture::layout`].
    pub fn pairs(expected: &[(&str, i32)]) -> Vec<(String, i32)> {
        expected.iter().map(|(n, o)| (n.to_string(), *o)).collect()
    }

    /// Rendered notifications, dropping the origin.
    pub fn messages(&self) -> Vec<String> {
        self.notifier.sent().into_iter().map(|(_, m)| m).collect()
    }
}

/// Wraps a real transaction and logs every call that takes row locks, in
/// the order a database would acquire them.
pub(crate) struct LockLog {
    inner: Box<dyn StoreTransaction>,
    pub locks: Vec<String>,
}

impl LockLog {
    pub async fn begin(store: &InMemoryTaskboardStore) -> Self {
        Self {
            inner: store.begin().await.unwrap(),
            locks: Vec::new(),
        }
    }

    fn log(&mut self, entry: String) {
        self.locks.push(entry);
    }
}

#[async_trait]
impl StoreTransaction for LockLog {
    async fn find_task(&mut self, id: &TaskId) -> Result<Option<Task>, DomainError> {
        self.log(format!("task {}", id));
        self.inner.find_task(id).await
    }

    async fn locate_task(&mut self, id: &TaskId) -> Result<Option<BoardId>, DomainError> {
        self.inner.locate_task(id).await
    }

    async fn tasks_on_board(&mut self, board_id: &BoardId) -> Result<Vec<Task>, DomainError> {
        self.log(format!("tasks on {}", board_id));
        self.inner.tasks_on_board(board_id).await
    }

    async fn tasks_assigned_to(&mut self, user_id: &UserId) -> Result<Vec<Task>, DomainError> {
        self.log(format!("tasks of {}", user_id));
        self.inner.tasks_assigned_to(user_id).await
    }

    async fn insert_task(&mut self, task: &Task) -> Result<(), DomainError> {
        self.inner.insert_task(task).await
    }

    async fn update_task(&mut self, task: &Task, expected: Version) -> Result<(), DomainError> {
        self.inner.update_task(task, expected).await
    }

    async fn set_task_orders(&mut self, orders: &[Slot<TaskId>]) -> Result<(), DomainError> {
        self.inner.set_task_orders(orders).await
    }

    async fn delete_task(&mut self, id: &TaskId, expected: Version) -> Result<(), DomainError> {
        self.inner.delete_task(id, expected).await
    }

    async fn find_board(&mut self, id: &BoardId) -> Result<Option<Board>, DomainError> {
        self.log(format!("board {}", id));
        self.inner.find_board(id).await
    }

    async fn boards(&mut self) -> Result<Vec<Board>, DomainError> {
        self.log("boards".to_string());
        self.inner.boards().await
    }

    async fn insert_board(&mut self, board: &Board) -> Result<(), DomainError> {
        self.inner.insert_board(board).await
    }

    async fn update_board(&mut self, board: &Board, expected: Version) -> Result<(), DomainError> {
        self.inner.update_board(board, expected).await
    }

    async fn set_board_orders(&mut self, orders: &[Slot<BoardId>]) -> Result<(), DomainError> {
        self.inner.set_board_orders(orders).await
    }

    async fn delete_board(&mut self, id: &BoardId, expected: Version) -> Result<(), DomainError> {
        self.inner.delete_board(id, expected).await
    }

    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.log(format!("user {}", id));
        self.inner.find_user(id).await
    }

    async fn find_user_by_name(&mut self, name: &str) -> Result<Option<User>, DomainError> {
        self.inner.find_user_by_name(name).await
    }

    async fn insert_user(&mut self, user: &User) -> Result<(), DomainError> {
        self.inner.insert_user(user).await
    }

    async fn update_user(&mut self, user: &User, expected: Version) -> Result<(), DomainError> {
        self.inner.update_user(user, expected).await
    }

    async fn delete_user(&mut self, id: &UserId, expected: Version) -> Result<(), DomainError> {
        self.inner.delete_user(id, expected).await
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.inner.rollback().await
    }
}

//! Application handlers.
//!
//! Command handlers run through the mutation orchestrator; query handlers
//! read committed state straight from the store.

pub mod board;
pub mod task;
pub mod user;

pub(crate) mod require;

#[cfg(test)]
pub(crate) mod test_support;

pub use board::{
    ensure_system_boards, CreateBoardCommand, CreateBoardHandler, DeleteBoardCommand,
    DeleteBoardHandler, EnsureSystemBoards, GetBoardHandler, ListBoardsHandler,
    UpdateBoardCommand, UpdateBoardHandler,
};
pub use task::{
    CreateTaskCommand, CreateTaskHandler, DeleteTaskCommand, DeleteTaskHandler, GetTaskHandler,
    ListTasksHandler, ReorderTaskCommand, ReorderTaskHandler, UpdateTaskCommand,
    UpdateTaskHandler,
};
pub use user::{
    CreateUserCommand, CreateUserHandler, DeleteUserCommand, DeleteUserHandler, GetUserHandler,
    ListUsersHandler, LoginCommand, LoginHandler, UpdateUserCommand, UpdateUserHandler,
};

//! Task command and query handlers.

mod create_task;
mod delete_task;
mod queries;
mod reorder_task;
mod update_task;

pub use create_task::{CreateTaskCommand, CreateTaskHandler};
pub use delete_task::{DeleteTaskCommand, DeleteTaskHandler};
pub use queries::{GetTaskHandler, ListTasksHandler};
pub use reorder_task::{ReorderTaskCommand, ReorderTaskHandler};
pub use update_task::{UpdateTaskCommand, UpdateTaskHandler};

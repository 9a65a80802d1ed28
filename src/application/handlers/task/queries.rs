//! Task query handlers. Reads see committed state only.

use std::sync::Arc;

use crate::application::errors::TaskboardError;
use crate::application::handlers::require::task_not_found;
use crate::domain::foundation::{BoardId, TaskId};
use crate::domain::task::Task;
use crate::ports::TaskboardStore;

/// Lists tasks, optionally for one board.
pub struct ListTasksHandler {
    store: Arc<dyn TaskboardStore>,
}

impl ListTasksHandler {
    pub fn new(store: Arc<dyn TaskboardStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, board_id: Option<&BoardId>) -> Result<Vec<Task>, TaskboardError> {
        Ok(self.store.list_tasks(board_id).await?)
    }
}

/// Fetches one task.
pub struct GetTaskHandler {
    store: Arc<dyn TaskboardStore>,
}

impl GetTaskHandler {
    pub fn new(store: Arc<dyn TaskboardStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, id: &TaskId) -> Result<Task, TaskboardError> {
        self.store
            .get_task(id)
            .await?
            .ok_or_else(|| task_not_found(id).into())
    }
}

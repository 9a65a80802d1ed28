//! Board query handlers.

use std::sync::Arc;

use crate::application::errors::TaskboardError;
use crate::application::handlers::require::board_not_found;
use crate::domain::board::Board;
use crate::domain::foundation::BoardId;
use crate::ports::TaskboardStore;

/// Lists boards in display order.
pub struct ListBoardsHandler {
    store: Arc<dyn TaskboardStore>,
}

impl ListBoardsHandler {
    pub fn new(store: Arc<dyn TaskboardStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self) -> Result<Vec<Board>, TaskboardError> {
        Ok(self.store.list_boards().await?)
    }
}

pub struct GetBoardHandler {
    store: Arc<dyn TaskboardStore>,
}

impl GetBoardHandler {
    pub fn new(store: Arc<dyn TaskboardStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, id: &BoardId) -> Result<Board, TaskboardError> {
        self.store
            .get_board(id)
            .await?
            .ok_or_else(|| board_not_found(id).into())
    }
}

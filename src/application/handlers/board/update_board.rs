//! UpdateBoardHandler - Command handler for renaming and repositioning boards.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::TaskboardError;
use crate::application::handlers::require;
use crate::application::orchestrator::{Committed, Mutation, MutationOrchestrator};
use crate::domain::board::{validate_name, Board};
use crate::domain::foundation::{BoardId, DomainError, ValidationError, Version};
use crate::domain::optimistic_lock;
use crate::domain::ordering::{reposition, Slot};
use crate::ports::{ChangeMessage, ClientIdentity, StoreTransaction};

/// Command to rename a board and optionally move it among boards.
#[derive(Debug, Clone)]
pub struct UpdateBoardCommand {
    pub board_id: BoardId,
    pub name: String,
    pub disp_order: Option<i32>,
    pub version: Version,
}

#[async_trait]
impl Mutation for UpdateBoardCommand {
    type Output = Board;

    fn name(&self) -> &'static str {
        "update_board"
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        match self.disp_order {
            Some(order) if order < 0 => Err(ValidationError::out_of_range(
                "dispOrder",
                0,
                i32::MAX as i64,
                order as i64,
            )),
            _ => Ok(()),
        }
    }

    async fn apply(self, tx: &mut dyn StoreTransaction) -> Result<Committed<Board>, DomainError> {
        let mut board = require::board(tx, &self.board_id).await?;
        let previous = optimistic_lock::acquire(&mut board, self.version)?;
        board.rename(self.name)?;

        let mut changed = vec![board.id().clone()];
        if let Some(to) = self.disp_order.filter(|to| *to != board.disp_order()) {
            let all: Vec<Slot<BoardId>> = tx.boards().await?.iter().map(Slot::from).collect();
            let placed = reposition(&all, board.id(), board.disp_order(), to);
            board.set_disp_order(placed.disp_order);
            tx.set_board_orders(&placed.shifted).await?;
            changed.extend(placed.shifted.into_iter().map(|s| s.key));
        }

        tx.update_board(&board, previous).await?;

        let changes = vec![ChangeMessage::boards(&changed)];
        Ok(Committed::new(board, changes))
    }
}

/// Handler for updating boards.
pub struct UpdateBoardHandler {
    orchestrator: Arc<MutationOrchestrator>,
}

impl UpdateBoardHandler {
    pub fn new(orchestrator: Arc<MutationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn handle(
        &self,
        cmd: UpdateBoardCommand,
        origin: Option<&ClientIdentity>,
    ) -> Result<Board, TaskboardError> {
        self.orchestrator.execute(origin, cmd).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::optimistic_lock::Versioned;
    use crate::ports::TaskboardStore;

    async fn board_names(fx: &Fixture) -> Vec<String> {
        fx.store
            .list_boards()
            .await
            .unwrap()
            .iter()
            .map(|b| b.name().to_string())
            .collect()
    }

    #[tokio::test]
    async fn renames_system_board() {
        let fx = Fixture::new();
        let board = UpdateBoardHandler::new(fx.orchestrator.clone())
            .handle(
                UpdateBoardCommand {
                    board_id: Fixture::board("todo"),
                    name: "Next".to_string(),
                    disp_order: None,
                    version: Version::INITIAL,
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(board.name(), "Next");
        assert!(board.is_system());
        assert_eq!(board.version(), Version::from_raw(2));
        assert_eq!(fx.messages(), vec!["UPDATE_BOARDS todo".to_string()]);
    }

    #[tokio::test]
    async fn reposition_shifts_neighbours() {
        let fx = Fixture::new();
        UpdateBoardHandler::new(fx.orchestrator.clone())
            .handle(
                UpdateBoardCommand {
                    board_id: Fixture::board("done"),
                    name: "Done".to_string(),
                    disp_order: Some(1),
                    version: Version::INITIAL,
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(board_names(&fx).await, vec!["Icebox", "Done", "Todo", "Doing"]);
    }

    #[tokio::test]
    async fn stale_version_conflicts() {
        let fx = Fixture::new();
        let err = UpdateBoardHandler::new(fx.orchestrator.clone())
            .handle(
                UpdateBoardCommand {
                    board_id: Fixture::board("todo"),
                    name: "Later".to_string(),
                    disp_order: None,
                    version: Version::from_raw(9),
                },
                None,
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::VersionConflict);
        assert_eq!(board_names(&fx).await[1], "Todo");
    }
}

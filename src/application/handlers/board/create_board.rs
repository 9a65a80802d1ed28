//! CreateBoardHandler - Command handler for creating boards.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::TaskboardError;
use crate::application::orchestrator::{Committed, Mutation, MutationOrchestrator};
use crate::domain::board::{validate_name, Board};
use crate::domain::foundation::{BoardId, DomainError, ValidationError};
use crate::domain::ordering::{append_position, Slot};
use crate::ports::{ChangeMessage, ClientIdentity, StoreTransaction};

/// Command to add a board after the existing ones.
#[derive(Debug, Clone)]
pub struct CreateBoardCommand {
    pub name: String,
}

#[async_trait]
impl Mutation for CreateBoardCommand {
    type Output = Board;

    fn name(&self) -> &'static str {
        "create_board"
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)
    }

    async fn apply(self, tx: &mut dyn StoreTransaction) -> Result<Committed<Board>, DomainError> {
        let existing: Vec<Slot<BoardId>> = tx.boards().await?.iter().map(Slot::from).collect();
        let board = Board::new(BoardId::generate(), self.name, append_position(&existing))?;
        tx.insert_board(&board).await?;

        let changes = vec![ChangeMessage::boards([board.id()])];
        Ok(Committed::new(board, changes))
    }
}

/// Handler for creating boards.
pub struct CreateBoardHandler {
    orchestrator: Arc<MutationOrchestrator>,
}

impl CreateBoardHandler {
    pub fn new(orchestrator: Arc<MutationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn handle(
        &self,
        cmd: CreateBoardCommand,
        origin: Option<&ClientIdentity>,
    ) -> Result<Board, TaskboardError> {
        self.orchestrator.execute(origin, cmd).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;

    #[tokio::test]
    async fn new_board_goes_after_system_boards() {
        let fx = Fixture::new();
        let board = CreateBoardHandler::new(fx.orchestrator.clone())
            .handle(
                CreateBoardCommand {
                    name: "Review".to_string(),
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(board.disp_order(), 4);
        assert!(!board.is_system());
        assert_eq!(fx.messages(), vec![format!("UPDATE_BOARDS {}", board.id())]);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let fx = Fixture::new();
        let err = CreateBoardHandler::new(fx.orchestrator.clone())
            .handle(CreateBoardCommand { name: String::new() }, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskboardError::ValidationFailed { .. }));
        assert!(fx.messages().is_empty());
    }
}

//! DeleteBoardHandler - Command handler for deleting empty user boards.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::TaskboardError;
use crate::application::handlers::require;
use crate::application::orchestrator::{Committed, Mutation, MutationOrchestrator};
use crate::domain::foundation::{BoardId, DomainError, ValidationError, Version};
use crate::domain::optimistic_lock;
use crate::domain::ordering::{close_gap, Slot};
use crate::ports::{ChangeMessage, ClientIdentity, StoreTransaction};

/// Command to delete a board. System boards and boards holding tasks stay.
#[derive(Debug, Clone)]
pub struct DeleteBoardCommand {
    pub board_id: BoardId,
    pub version: Version,
}

#[async_trait]
impl Mutation for DeleteBoardCommand {
    type Output = ();

    fn name(&self) -> &'static str {
        "delete_board"
    }

    async fn apply(self, tx: &mut dyn StoreTransaction) -> Result<Committed<()>, DomainError> {
        let board = require::board(tx, &self.board_id).await?;
        optimistic_lock::check(&board, self.version)?;
        board.ensure_deletable()?;

        let remaining = tx.tasks_on_board(board.id()).await?.len();
        if remaining > 0 {
            return Err(ValidationError::invalid_format(
                "boardId",
                format!("board still holds {} task(s)", remaining),
            )
            .into());
        }

        let all: Vec<Slot<BoardId>> = tx.boards().await?.iter().map(Slot::from).collect();
        let shifted = close_gap(&all, board.id(), board.disp_order());

        tx.delete_board(board.id(), self.version).await?;
        tx.set_board_orders(&shifted).await?;

        Ok(Committed::new((), vec![ChangeMessage::boards([board.id()])]))
    }
}

/// Handler for deleting boards.
pub struct DeleteBoardHandler {
    orchestrator: Arc<MutationOrchestrator>,
}

impl DeleteBoardHandler {
    pub fn new(orchestrator: Arc<MutationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn handle(
        &self,
        cmd: DeleteBoardCommand,
        origin: Option<&ClientIdentity>,
    ) -> Result<(), TaskboardError> {
        self.orchestrator.execute(origin, cmd).await
    }
}

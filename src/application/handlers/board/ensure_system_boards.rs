//! Startup bootstrap that creates any missing system board.

use async_trait::async_trait;

use crate::application::errors::TaskboardError;
use crate::application::orchestrator::{Committed, Mutation, MutationOrchestrator};
use crate::domain::board::SYSTEM_BOARDS;
use crate::domain::foundation::{BoardId, DomainError};
use crate::domain::ordering::{open_slot, Slot};
use crate::ports::{ChangeMessage, StoreTransaction};

/// Inserts each missing system board at its canonical position.
#[derive(Debug, Clone, Default)]
pub struct EnsureSystemBoards;

#[async_trait]
impl Mutation for EnsureSystemBoards {
    type Output = Vec<BoardId>;

    fn name(&self) -> &'static str {
        "ensure_system_boards"
    }

    async fn apply(
        self,
        tx: &mut dyn StoreTransaction,
    ) -> Result<Committed<Vec<BoardId>>, DomainError> {
        let mut created = Vec::new();
        for system in SYSTEM_BOARDS.iter() {
            let board = system.to_board();
            if tx.find_board(board.id()).await?.is_some() {
                continue;
            }
            let existing: Vec<Slot<BoardId>> = tx.boards().await?.iter().map(Slot::from).collect();
            let opened = open_slot(&existing, system.disp_order);
            tx.set_board_orders(&opened.shifted).await?;

            let mut board = board;
            board.set_disp_order(opened.disp_order);
            tx.insert_board(&board).await?;
            created.push(board.id().clone());
        }

        let changes = if created.is_empty() {
            Vec::new()
        } else {
            vec![ChangeMessage::boards(&created)]
        };
        Ok(Committed::new(created, changes))
    }
}

/// Runs [`EnsureSystemBoards`] once at startup.
pub async fn ensure_system_boards(
    orchestrator: &MutationOrchestrator,
) -> Result<Vec<BoardId>, TaskboardError> {
    let created = orchestrator.execute(None, EnsureSystemBoards).await?;
    if !created.is_empty() {
        tracing::info!(count = created.len(), "created system boards");
    }
    Ok(created)
}

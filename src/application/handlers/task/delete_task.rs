//! DeleteTaskHandler - Command handler for deleting tasks.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::TaskboardError;
use crate::application::handlers::require;
use crate::application::orchestrator::{Committed, Mutation, MutationOrchestrator};
use crate::domain::foundation::{DomainError, TaskId, Version};
use crate::domain::optimistic_lock;
use crate::domain::ordering::{close_gap, Slot};
use crate::ports::{ChangeMessage, ClientIdentity, StoreTransaction};

/// Command to delete a task. Later tasks on its board move up by one.
#[derive(Debug, Clone)]
pub struct DeleteTaskCommand {
    pub task_id: TaskId,
    pub version: Version,
}

#[async_trait]
impl Mutation for DeleteTaskCommand {
    type Output = ();

    fn name(&self) -> &'static str {
        "delete_task"
    }

    async fn apply(self, tx: &mut dyn StoreTransaction) -> Result<Committed<()>, DomainError> {
        // Same lock order as moves: the board row, then its task list.
        let board_id = tx
            .locate_task(&self.task_id)
            .await?
            .ok_or_else(|| require::task_not_found(&self.task_id))?;
        tx.find_board(&board_id).await?;
        let on_board = tx.tasks_on_board(&board_id).await?;

        let task = match on_board.iter().find(|t| t.id() == &self.task_id) {
            Some(task) => task.clone(),
            None => require::task(tx, &self.task_id).await?,
        };
        optimistic_lock::check(&task, self.version)?;
        if task.board_id() != &board_id {
            return Err(DomainError::concurrent_update(format!(
                "Task {} moved while being deleted",
                task.id()
            )));
        }

        let siblings: Vec<Slot<TaskId>> = on_board.iter().map(Slot::from).collect();
        let shifted = close_gap(&siblings, task.id(), task.disp_order());

        tx.delete_task(task.id(), self.version).await?;
        tx.set_task_orders(&shifted).await?;

        Ok(Committed::new(
            (),
            vec![ChangeMessage::task_boards([task.board_id()])],
        ))
    }
}

/// Handler for deleting tasks.
pub struct DeleteTaskHandler {
    orchestrator: Arc<MutationOrchestrator>,
}

impl DeleteTaskHandler {
    pub fn new(orchestrator: Arc<MutationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn handle(
        &self,
        cmd: DeleteTaskCommand,
        origin: Option<&ClientIdentity>,
    ) -> Result<(), TaskboardError> {
        self.orchestrator.execute(origin, cmd).await
    }
}

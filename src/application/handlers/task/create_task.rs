//! CreateTaskHandler - Command handler for creating tasks.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::TaskboardError;
use crate::application::handlers::require;
use crate::application::orchestrator::{Committed, Mutation, MutationOrchestrator};
use crate::domain::board::SystemBoard;
use crate::domain::foundation::{BoardId, DomainError, TaskId, ValidationError};
use crate::domain::ordering::{append_position, Slot};
use crate::domain::task::{Task, TaskEdit};
use crate::ports::{ChangeMessage, ClientIdentity, StoreTransaction};

/// Command to create a task at the end of a board.
#[derive(Debug, Clone)]
pub struct CreateTaskCommand {
    pub edit: TaskEdit,
    /// Defaults to the Icebox board.
    pub board_id: Option<BoardId>,
}

#[async_trait]
impl Mutation for CreateTaskCommand {
    type Output = Task;

    fn name(&self) -> &'static str {
        "create_task"
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.edit.validate()
    }

    async fn apply(self, tx: &mut dyn StoreTransaction) -> Result<Committed<Task>, DomainError> {
        let board_id = self.board_id.unwrap_or_else(SystemBoard::icebox);
        require::board(tx, &board_id).await?;
        if let Some(assignee) = &self.edit.assignee {
            require::user(tx, assignee).await?;
        }

        let siblings: Vec<Slot<TaskId>> = tx
            .tasks_on_board(&board_id)
            .await?
            .iter()
            .map(Slot::from)
            .collect();
        let task = Task::new(
            TaskId::generate(),
            self.edit,
            board_id,
            append_position(&siblings),
        )?;
        tx.insert_task(&task).await?;

        let changes = vec![ChangeMessage::task_boards([task.board_id()])];
        Ok(Committed::new(task, changes))
    }
}

/// Handler for creating tasks.
pub struct CreateTaskHandler {
    orchestrator: Arc<MutationOrchestrator>,
}

impl CreateTaskHandler {
    pub fn new(orchestrator: Arc<MutationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn handle(
        &self,
        cmd: CreateTaskCommand,
        origin: Option<&ClientIdentity>,
    ) -> Result<Task, TaskboardError> {
        self.orchestrator.execute(origin, cmd).await
    }
}

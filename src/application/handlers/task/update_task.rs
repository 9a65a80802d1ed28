//! UpdateTaskHandler - Command handler for editing task fields.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::TaskboardError;
use crate::application::handlers::require;
use crate::application::orchestrator::{Committed, Mutation, MutationOrchestrator};
use crate::domain::foundation::{BoardId, DomainError, TaskId, ValidationError, Version};
use crate::domain::optimistic_lock;
use crate::domain::task::{Task, TaskEdit};
use crate::ports::{ChangeMessage, ClientIdentity, StoreTransaction};

/// Command to edit a task. Position changes go through reordering instead.
#[derive(Debug, Clone)]
pub struct UpdateTaskCommand {
    pub task_id: TaskId,
    pub edit: TaskEdit,
    /// Board the client believes the task is on. Must match when present.
    pub board_id: Option<BoardId>,
    pub version: Version,
}

#[async_trait]
impl Mutation for UpdateTaskCommand {
    type Output = Task;

    fn name(&self) -> &'static str {
        "update_task"
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.edit.validate()
    }

    async fn apply(self, tx: &mut dyn StoreTransaction) -> Result<Committed<Task>, DomainError> {
        let mut task = require::task(tx, &self.task_id).await?;
        let previous = optimistic_lock::acquire(&mut task, self.version)?;

        if let Some(board_id) = &self.board_id {
            if board_id != task.board_id() {
                return Err(ValidationError::invalid_format(
                    "boardId",
                    "moving a task between boards requires a reorder",
                )
                .into());
            }
        }
        if let Some(assignee) = &self.edit.assignee {
            require::user(tx, assignee).await?;
        }

        task.apply_edit(self.edit)?;
        tx.update_task(&task, previous).await?;

        let changes = vec![ChangeMessage::tasks([task.id()])];
        Ok(Committed::new(task, changes))
    }
}

/// Handler for editing tasks.
pub struct UpdateTaskHandler {
    orchestrator: Arc<MutationOrchestrator>,
}

impl UpdateTaskHandler {
    pub fn new(orchestrator: Arc<MutationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn handle(
        &self,
        cmd: UpdateTaskCommand,
        origin: Option<&ClientIdentity>,
    ) -> Result<Task, TaskboardError> {
        self.orchestrator.execute(origin, cmd).await
    }
}

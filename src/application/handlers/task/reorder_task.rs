//! ReorderTaskHandler - Command handler for drag-and-drop task moves.
//!
//! A move is guarded by the position the client last saw rather than by a
//! version number: if the task is no longer at `from_board#from_disp_order`
//! the request is stale and fails with `StaleOrder`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::TaskboardError;
use crate::application::handlers::require;
use crate::application::orchestrator::{Committed, Mutation, MutationOrchestrator};
use crate::domain::foundation::{BoardId, DomainError, TaskId, ValidationError};
use crate::domain::optimistic_lock::{self, Versioned};
use crate::domain::ordering::{plan_task_move, Slot, TaskMove};
use crate::domain::task::Task;
use crate::ports::{ChangeMessage, ClientIdentity, StoreTransaction};

/// Command to move a task within or across boards.
#[derive(Debug, Clone)]
pub struct ReorderTaskCommand {
    pub request: TaskMove,
}

fn slots_on(lists: &[(BoardId, Vec<Task>)], board_id: &BoardId) -> Vec<Slot<TaskId>> {
    lists
        .iter()
        .find(|(id, _)| id == board_id)
        .map(|(_, tasks)| tasks.iter().map(Slot::from).collect())
        .unwrap_or_default()
}

#[async_trait]
impl Mutation for ReorderTaskCommand {
    type Output = Task;

    fn name(&self) -> &'static str {
        "reorder_task"
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.request.validate()
    }

    async fn apply(self, tx: &mut dyn StoreTransaction) -> Result<Committed<Task>, DomainError> {
        let request = self.request;

        // Board rows first, then their task lists, both in board id order.
        let mut boards = request.affected_boards();
        boards.sort();
        for board_id in &boards {
            if board_id == &request.to_board {
                require::board(tx, board_id).await?;
            } else {
                tx.find_board(board_id).await?;
            }
        }
        let mut lists = Vec::with_capacity(boards.len());
        for board_id in boards {
            let tasks = tx.tasks_on_board(&board_id).await?;
            lists.push((board_id, tasks));
        }

        let listed = lists
            .iter()
            .flat_map(|(_, tasks)| tasks)
            .find(|t| t.id() == &request.task_id)
            .cloned();
        // Not on either board: gone, or moved elsewhere (stale).
        let mut task = match listed {
            Some(task) => task,
            None => require::task(tx, &request.task_id).await?,
        };

        let source = slots_on(&lists, &request.from_board);
        let destination = if request.is_same_board() {
            Vec::new()
        } else {
            slots_on(&lists, &request.to_board)
        };

        let plan = plan_task_move(&task, &request, &source, &destination)?;

        let read_version = task.version();
        optimistic_lock::acquire(&mut task, read_version)?;
        task.place(plan.board_id, plan.disp_order);

        tx.set_task_orders(&plan.shifted).await?;
        tx.update_task(&task, read_version).await?;

        let changes = vec![ChangeMessage::task_boards(&request.affected_boards())];
        Ok(Committed::new(task, changes))
    }
}

/// Handler for moving tasks.
pub struct ReorderTaskHandler {
    orchestrator: Arc<MutationOrchestrator>,
}

impl ReorderTaskHandler {
    pub fn new(orchestrator: Arc<MutationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn handle(
        &self,
        cmd: ReorderTaskCommand,
        origin: Option<&ClientIdentity>,
    ) -> Result<Task, TaskboardError> {
        self.orchestrator.execute(origin, cmd).await
    }
}

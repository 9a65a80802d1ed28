//! DeleteUserHandler - Command handler for removing users.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::TaskboardError;
use crate::application::handlers::require;
use crate::application::orchestrator::{Committed, Mutation, MutationOrchestrator};
use crate::domain::foundation::{DomainError, TaskId, UserId, Version};
use crate::domain::optimistic_lock::{self, Versioned};
use crate::ports::{ChangeMessage, ClientIdentity, StoreTransaction};

/// Command to delete a user. Their tasks stay, unassigned.
#[derive(Debug, Clone)]
pub struct DeleteUserCommand {
    pub user_id: UserId,
    pub version: Version,
}

#[async_trait]
impl Mutation for DeleteUserCommand {
    type Output = ();

    fn name(&self) -> &'static str {
        "delete_user"
    }

    async fn apply(self, tx: &mut dyn StoreTransaction) -> Result<Committed<()>, DomainError> {
        let user = require::user(tx, &self.user_id).await?;
        optimistic_lock::check(&user, self.version)?;

        let mut unassigned: Vec<TaskId> = Vec::new();
        for mut task in tx.tasks_assigned_to(user.id()).await? {
            let read_version = task.version();
            optimistic_lock::acquire(&mut task, read_version)?;
            task.unassign();
            tx.update_task(&task, read_version).await?;
            unassigned.push(task.id().clone());
        }

        tx.delete_user(user.id(), self.version).await?;

        let mut changes = vec![ChangeMessage::user_list()];
        if !unassigned.is_empty() {
            changes.push(ChangeMessage::tasks(&unassigned));
        }
        Ok(Committed::new((), changes))
    }
}

/// Handler for deleting users.
pub struct DeleteUserHandler {
    orchestrator: Arc<MutationOrchestrator>,
}

impl DeleteUserHandler {
    pub fn new(orchestrator: Arc<MutationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn handle(
        &self,
        cmd: DeleteUserCommand,
        origin: Option<&ClientIdentity>,
    ) -> Result<(), TaskboardError> {
        self.orchestrator.execute(origin, cmd).await
    }
}

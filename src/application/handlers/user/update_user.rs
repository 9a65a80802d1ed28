//! UpdateUserHandler - Command handler for editing user profiles.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::create_user::duplicate_name;
use crate::application::errors::TaskboardError;
use crate::application::handlers::require;
use crate::application::orchestrator::{Committed, Mutation, MutationOrchestrator};
use crate::domain::foundation::{DomainError, UserId, Version};
use crate::domain::optimistic_lock;
use crate::domain::user::{validate_avatar, validate_name, PasswordHash, User};
use crate::ports::{ChangeMessage, ClientIdentity, PasswordHasher, StoreTransaction};

/// Command to edit a user. An absent or empty password keeps the old one.
#[derive(Debug, Clone)]
pub struct UpdateUserCommand {
    pub user_id: UserId,
    pub name: String,
    pub password: Option<SecretString>,
    pub avatar: String,
    pub version: Version,
}

struct ApplyUserUpdate {
    user_id: UserId,
    name: String,
    avatar: String,
    password_hash: Option<PasswordHash>,
    version: Version,
}

#[async_trait]
impl Mutation for ApplyUserUpdate {
    type Output = User;

    fn name(&self) -> &'static str {
        "update_user"
    }

    async fn apply(self, tx: &mut dyn StoreTransaction) -> Result<Committed<User>, DomainError> {
        let mut user = require::user(tx, &self.user_id).await?;
        let previous = optimistic_lock::acquire(&mut user, self.version)?;

        if let Some(other) = tx.find_user_by_name(&self.name).await? {
            if other.id() != user.id() {
                return Err(duplicate_name(&self.name));
            }
        }

        user.update_profile(self.name, self.avatar)?;
        if let Some(hash) = self.password_hash {
            user.set_password_hash(hash);
        }
        tx.update_user(&user, previous).await?;

        let changes = vec![ChangeMessage::users([user.id()])];
        Ok(Committed::new(user, changes))
    }
}

/// Handler for editing users.
pub struct UpdateUserHandler {
    orchestrator: Arc<MutationOrchestrator>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UpdateUserHandler {
    pub fn new(orchestrator: Arc<MutationOrchestrator>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            orchestrator,
            hasher,
        }
    }

    pub async fn handle(
        &self,
        cmd: UpdateUserCommand,
        origin: Option<&ClientIdentity>,
    ) -> Result<User, TaskboardError> {
        validate_name(&cmd.name)?;
        validate_avatar(&cmd.avatar)?;

        let password_hash = match cmd.password.as_ref().filter(|p| !p.expose_secret().is_empty()) {
            Some(password) => Some(self.hasher.hash(password).await?),
            None => None,
        };

        self.orchestrator
            .execute(
                origin,
                ApplyUserUpdate {
                    user_id: cmd.user_id,
                    name: cmd.name,
                    avatar: cmd.avatar,
                    password_hash,
                    version: cmd.version,
                },
            )
            .await
    }
}

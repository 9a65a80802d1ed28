//! CreateUserHandler - Command handler for registering users.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::application::errors::TaskboardError;
use crate::application::orchestrator::{Committed, Mutation, MutationOrchestrator};
use crate::domain::foundation::{DomainError, ErrorCode, UserId, ValidationError};
use crate::domain::user::{validate_avatar, validate_name, PasswordHash, User};
use crate::ports::{ChangeMessage, ClientIdentity, PasswordHasher, StoreTransaction};

/// Command to register a user.
#[derive(Debug, Clone)]
pub struct CreateUserCommand {
    pub name: String,
    pub password: SecretString,
    pub avatar: String,
}

/// Insert step, run after the password has been hashed.
struct InsertUser {
    name: String,
    password_hash: PasswordHash,
    avatar: String,
}

pub(crate) fn duplicate_name(name: &str) -> DomainError {
    DomainError::new(
        ErrorCode::DuplicateName,
        format!("User name already taken: {}", name),
    )
    .with_detail("field", "name")
}

#[async_trait]
impl Mutation for InsertUser {
    type Output = User;

    fn name(&self) -> &'static str {
        "create_user"
    }

    async fn apply(self, tx: &mut dyn StoreTransaction) -> Result<Committed<User>, DomainError> {
        if tx.find_user_by_name(&self.name).await?.is_some() {
            return Err(duplicate_name(&self.name));
        }
        let user = User::new(UserId::generate(), self.name, self.password_hash, self.avatar)?;
        tx.insert_user(&user).await?;

        let changes = vec![ChangeMessage::user_list()];
        Ok(Committed::new(user, changes))
    }
}

/// Handler for registering users.
pub struct CreateUserHandler {
    orchestrator: Arc<MutationOrchestrator>,
    hasher: Arc<dyn PasswordHasher>,
}

impl CreateUserHandler {
    pub fn new(orchestrator: Arc<MutationOrchestrator>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            orchestrator,
            hasher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateUserCommand,
        origin: Option<&ClientIdentity>,
    ) -> Result<User, TaskboardError> {
        validate_name(&cmd.name)?;
        validate_avatar(&cmd.avatar)?;
        if cmd.password.expose_secret().is_empty() {
            return Err(ValidationError::empty_field("password").into());
        }

        // Hash outside the transaction; bcrypt is slow on purpose.
        let password_hash = self.hasher.hash(&cmd.password).await?;

        self.orchestrator
            .execute(
                origin,
                InsertUser {
                    name: cmd.name,
                    password_hash,
                    avatar: cmd.avatar,
                },
            )
            .await
    }
}

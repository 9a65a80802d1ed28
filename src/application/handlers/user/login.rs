//! LoginHandler - Verifies a user name and password.

use std::sync::Arc;

use secrecy::SecretString;

use crate::application::errors::TaskboardError;
use crate::domain::user::User;
use crate::ports::{PasswordHasher, TaskboardStore};

#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub name: String,
    pub password: SecretString,
}

/// Handler for logins. Unknown names and wrong passwords look the same.
pub struct LoginHandler {
    store: Arc<dyn TaskboardStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl LoginHandler {
    pub fn new(store: Arc<dyn TaskboardStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    pub async fn handle(&self, cmd: LoginCommand) -> Result<User, TaskboardError> {
        let Some(user) = self.store.get_user_by_name(&cmd.name).await? else {
            tracing::info!(name = %cmd.name, "login rejected: unknown user");
            return Err(TaskboardError::Unauthorized);
        };

        if !self.hasher.verify(&cmd.password, user.password_hash()).await? {
            tracing::info!(user_id = %user.id(), "login rejected: wrong password");
            return Err(TaskboardError::Unauthorized);
        }

        tracing::info!(user_id = %user.id(), "login succeeded");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{Fixture, PlainHasher};

    fn login(name: &str, password: &str) -> LoginCommand {
        LoginCommand {
            name: name.to_string(),
            password: SecretString::new(password.to_string()),
        }
    }

    #[tokio::test]
    async fn correct_password_returns_user() {
        let fx = Fixture::new();
        let alice = fx.add_user("alice").await;
        let handler = LoginHandler::new(fx.store.clone(), Arc::new(PlainHasher));

        let user = handler.handle(login("alice", "password")).await.unwrap();

        assert_eq!(user.id(), alice.id());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_unauthorized() {
        let fx = Fixture::new();
        fx.add_user("alice").await;
        let handler = LoginHandler::new(fx.store.clone(), Arc::new(PlainHasher));

        assert_eq!(
            handler.handle(login("alice", "nope")).await.unwrap_err(),
            TaskboardError::Unauthorized
        );
        assert_eq!(
            handler.handle(login("mallory", "password")).await.unwrap_err(),
            TaskboardError::Unauthorized
        );
    }
}

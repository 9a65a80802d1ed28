//! User query handlers.

use std::sync::Arc;

use crate::application::errors::TaskboardError;
use crate::application::handlers::require::user_not_found;
use crate::domain::foundation::UserId;
use crate::domain::user::User;
use crate::ports::TaskboardStore;

/// Lists users ordered by name.
pub struct ListUsersHandler {
    store: Arc<dyn TaskboardStore>,
}

impl ListUsersHandler {
    pub fn new(store: Arc<dyn TaskboardStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self) -> Result<Vec<User>, TaskboardError> {
        Ok(self.store.list_users().await?)
    }
}

pub struct GetUserHandler {
    store: Arc<dyn TaskboardStore>,
}

impl GetUserHandler {
    pub fn new(store: Arc<dyn TaskboardStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, id: &UserId) -> Result<User, TaskboardError> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| user_not_found(id).into())
    }
}

//! User command and query handlers.

mod create_user;
mod delete_user;
mod login;
mod queries;
mod update_user;

pub use create_user::{CreateUserCommand, CreateUserHandler};
pub use delete_user::{DeleteUserCommand, DeleteUserHandler};
pub use login::{LoginCommand, LoginHandler};
pub use queries::{GetUserHandler, ListUsersHandler};
pub use update_user::{UpdateUserCommand, UpdateUserHandler};

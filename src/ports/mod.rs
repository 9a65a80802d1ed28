//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `TaskboardStore` / `StoreTransaction` - transactional persistence
//! - `ChangeNotifier` - post-commit fan-out to connected clients
//! - `PasswordHasher` - password hashing for user accounts

mod change_notifier;
mod password_hasher;
mod taskboard_store;

pub use change_notifier::{ChangeKind, ChangeMessage, ChangeNotifier, ClientIdentity};
pub use password_hasher::PasswordHasher;
pub use taskboard_store::{StoreTransaction, TaskboardStore};

//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `memory` - in-process store for tests and local runs
//! - `postgres` - PostgreSQL store
//! - `password` - bcrypt password hashing
//! - `websocket` - connection hub, session registry, and change fan-out
//! - `http` - REST endpoints

pub mod http;
pub mod memory;
pub mod password;
pub mod postgres;
pub mod websocket;

pub use memory::InMemoryTaskboardStore;
pub use password::BcryptPasswordHasher;
pub use postgres::PostgresTaskboardStore;
pub use websocket::{ConnectionHub, SessionRegistry, WebSocketNotifier, WebSocketState};

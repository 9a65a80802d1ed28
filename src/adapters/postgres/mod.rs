//! PostgreSQL adapter for the taskboard store.
//!
//! - `PostgresTaskboardStore` - pooled store; each transaction holds row locks
//!   until commit or rollback

mod rows;
mod taskboard_store;

pub use taskboard_store::PostgresTaskboardStore;

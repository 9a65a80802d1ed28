//! In-memory adapters for tests and local development.

mod store;

pub use store::InMemoryTaskboardStore;

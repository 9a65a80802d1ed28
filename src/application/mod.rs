//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Every command runs through [`MutationOrchestrator`]; queries go straight
//! to the store.

pub mod errors;
pub mod handlers;
pub mod orchestrator;

pub use errors::TaskboardError;
pub use handlers::*;
pub use orchestrator::{Committed, Mutation, MutationOrchestrator};

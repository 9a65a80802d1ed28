//! Task domain module.
//!
//! Tasks are the cards on a board. Their ordering is maintained by
//! [`crate::domain::ordering`]; edits go through the optimistic lock guard.

mod aggregate;

pub use aggregate::{Task, TaskEdit, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH};

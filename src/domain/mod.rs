//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, versions, timestamps, errors)
//! - `optimistic_lock` - Version check-and-increment guard
//! - `ordering` - Display-order planning for drag-and-drop moves
//! - `task` - Task entity
//! - `board` - Board entity and the built-in system boards
//! - `user` - User entity

pub mod board;
pub mod foundation;
pub mod optimistic_lock;
pub mod ordering;
pub mod task;
pub mod user;

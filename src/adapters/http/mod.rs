//! HTTP adapter - REST API for tasks, boards, and users.
//!
//! Mutating endpoints read the caller's identity from the
//! `taskboard-from-id` header and pass it to the orchestrator so the
//! resulting change notification skips that caller.

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;

pub use error::ApiError;
pub use extract::{Origin, FROM_ID_HEADER};
pub use handlers::TaskboardAppState;
pub use routes::{taskboard_router, with_middleware, API_PREFIX};

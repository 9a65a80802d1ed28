//! Taskboard - collaborative task board backend.
//!
//! Clients edit tasks, boards, and users over HTTP. Every committed change
//! is announced over WebSocket to all connected clients except the one
//! that made it. Concurrent edits are guarded by per-row versions; task
//! positions are kept dense by the ordering engine.

pub mod adapters;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

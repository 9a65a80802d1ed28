//! WebSocket adapters for live change notifications.
//!
//! ```text
//!  MutationOrchestrator ── notify(origin, change) ──▶ WebSocketNotifier
//!                                                        │
//!                        SessionRegistry ◀── resolve ────┤
//!                        (identity → connection)         │ broadcast
//!                                                        ▼
//!                                                  ConnectionHub
//!                                          ├── connection-a (origin, skipped)
//!                                          ├── connection-b
//!                                          └── connection-c
//! ```
//!
//! - [`hub`] - live connections and the broadcast channel
//! - [`registry`] - identity to connection map
//! - [`notifier`] - `ChangeNotifier` implementation
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod handler;
pub mod hub;
pub mod notifier;
pub mod registry;

pub use handler::{websocket_router, ws_handler, WebSocketState};
pub use hub::{ConnectionHub, ConnectionId, Envelope};
pub use notifier::WebSocketNotifier;
pub use registry::SessionRegistry;

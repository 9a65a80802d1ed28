//! Wiring of ports, adapters, and application services.

use std::sync::Arc;

use axum::Router;

use crate::adapters::http::{taskboard_router, with_middleware, TaskboardAppState};
use crate::adapters::websocket::{ConnectionHub, SessionRegistry, WebSocketNotifier, WebSocketState};
use crate::application::{ensure_system_boards, MutationOrchestrator, TaskboardError};
use crate::config::{RealtimeConfig, ServerConfig};
use crate::ports::{PasswordHasher, TaskboardStore};

/// Builds the shared HTTP state around a store and password hasher.
///
/// The hub, session registry, and notifier are created here so that the
/// orchestrator and the WebSocket endpoint share the same instances.
pub fn build_state(
    store: Arc<dyn TaskboardStore>,
    hasher: Arc<dyn PasswordHasher>,
    realtime: &RealtimeConfig,
) -> TaskboardAppState {
    let hub = Arc::new(ConnectionHub::new(realtime.channel_capacity));
    let registry = Arc::new(SessionRegistry::new());
    let notifier = Arc::new(WebSocketNotifier::new(hub.clone(), registry.clone()));
    let orchestrator = Arc::new(MutationOrchestrator::new(store.clone(), notifier));

    TaskboardAppState::new(
        orchestrator,
        store,
        hasher,
        WebSocketState::new(hub, registry),
    )
}

/// Seeds the system boards, then returns the fully layered router.
pub async fn build_app(
    state: TaskboardAppState,
    server: &ServerConfig,
) -> Result<Router, TaskboardError> {
    ensure_system_boards(&state.orchestrator).await?;
    Ok(with_middleware(taskboard_router(state), server))
}

//! WebSocket upgrade handler for live change notifications.
//!
//! Connection lifecycle:
//! 1. Upgrade to WebSocket
//! 2. Join the hub and, when `?from=` names an identity, register it
//! 3. Forward hub broadcasts as text frames until either side stops
//! 4. Unregister (only if still the current entry) and leave the hub
//!
//! Frames from the client are read only to notice disconnects.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use super::hub::{ConnectionHub, ConnectionId};
use super::registry::SessionRegistry;
use crate::ports::ClientIdentity;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub hub: Arc<ConnectionHub>,
    pub registry: Arc<SessionRegistry>,
}

impl WebSocketState {
    pub fn new(hub: Arc<ConnectionHub>, registry: Arc<SessionRegistry>) -> Self {
        Self { hub, registry }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub from: Option<String>,
}

/// Route: `GET /taskboard/ws?from=<identity>`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<WebSocketState>,
) -> Response {
    let identity = ClientIdentity::parse(params.from.as_deref());
    ws.on_upgrade(move |socket| handle_socket(socket, identity, state))
}

async fn handle_socket(
    socket: WebSocket,
    identity: Option<ClientIdentity>,
    state: WebSocketState,
) {
    let (mut sender, mut receiver) = socket.split();

    let (connection, mut hub_rx) = state.hub.join().await;
    if let Some(identity) = &identity {
        if let Some(replaced) = state.registry.register(identity.clone(), connection).await {
            tracing::info!(
                %identity,
                %replaced,
                %connection,
                "identity reconnected, replacing entry"
            );
        }
    }
    let live = state.hub.connection_count().await;
    tracing::info!(
        %connection,
        identity = ?identity.as_ref().map(ClientIdentity::as_str),
        live,
        "websocket connected"
    );

    let mut send_task = tokio::spawn(async move {
        loop {
            match hub_rx.recv().await {
                Ok(envelope) => {
                    if !envelope.is_for(connection) {
                        continue;
                    }
                    let frame = Message::Text(envelope.text.to_string());
                    if let Err(e) = sender.send(frame).await {
                        tracing::debug!(%connection, "Send error, closing connection: {}", e);
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(%connection, skipped, "slow client skipped notifications");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    tracing::debug!(%connection, "Client sent close frame");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(%connection, "Receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    disconnect(&state, identity.as_ref(), connection).await;
}

async fn disconnect(
    state: &WebSocketState,
    identity: Option<&ClientIdentity>,
    connection: ConnectionId,
) {
    if let Some(identity) = identity {
        state.registry.unregister(identity, connection).await;
    }
    let live = state.hub.leave(&connection).await;
    tracing::info!(%connection, live, "websocket disconnected");
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/ws", get(ws_handler))
}

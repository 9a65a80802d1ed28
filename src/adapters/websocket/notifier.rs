//! [`ChangeNotifier`] backed by the connection hub.

use std::sync::Arc;

use async_trait::async_trait;

use super::hub::ConnectionHub;
use super::registry::SessionRegistry;
use crate::ports::{ChangeMessage, ChangeNotifier, ClientIdentity};

/// Pushes change messages to every live WebSocket except the originator's.
pub struct WebSocketNotifier {
    hub: Arc<ConnectionHub>,
    registry: Arc<SessionRegistry>,
}

impl WebSocketNotifier {
    pub fn new(hub: Arc<ConnectionHub>, registry: Arc<SessionRegistry>) -> Self {
        Self { hub, registry }
    }
}

#[async_trait]
impl ChangeNotifier for WebSocketNotifier {
    async fn notify(&self, origin: Option<&ClientIdentity>, change: &ChangeMessage) {
        let text = change.to_string();
        let excluded = match origin {
            Some(identity) => self.registry.resolve(identity).await,
            None => None,
        };

        match excluded {
            Some(connection) => {
                tracing::debug!(
                    message = %text,
                    origin = ?origin.map(ClientIdentity::as_str),
                    "broadcasting to others"
                );
                self.hub.broadcast_except(text, connection);
            }
            None => {
                tracing::debug!(message = %text, "broadcasting to all");
                self.hub.broadcast(text);
            }
        }
    }
}

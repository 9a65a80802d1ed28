//! Connection hub: every live WebSocket subscribes to one broadcast channel.
//!
//! A broadcast carries an optional excluded connection; each connection's
//! forwarding task drops envelopes addressed away from it. This keeps
//! fan-out a single channel send regardless of how many clients are live.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Server-assigned identifier for one WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One outbound text frame and the connection that must not receive it.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub text: Arc<str>,
    pub except: Option<ConnectionId>,
}

impl Envelope {
    /// Whether `connection` should receive this envelope.
    pub fn is_for(&self, connection: ConnectionId) -> bool {
        self.except != Some(connection)
    }
}

/// Tracks live connections and fans text frames out to them.
///
/// # Thread Safety
///
/// The broadcast sender is lock-free; the connection set sits behind a
/// `RwLock` and is only written on connect and disconnect.
pub struct ConnectionHub {
    sender: broadcast::Sender<Envelope>,
    connections: RwLock<HashSet<ConnectionId>>,
}

impl ConnectionHub {
    /// Create a hub whose channel buffers `channel_capacity` frames.
    ///
    /// A connection that falls further behind skips the oldest frames.
    pub fn new(channel_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            sender,
            connections: RwLock::new(HashSet::new()),
        }
    }

    /// Create with default capacity (256 frames).
    pub fn with_default_capacity() -> Self {
        Self::new(256)
    }

    /// Register a new connection and subscribe it to broadcasts.
    pub async fn join(&self) -> (ConnectionId, broadcast::Receiver<Envelope>) {
        let id = ConnectionId::new();
        let receiver = self.sender.subscribe();
        self.connections.write().await.insert(id);
        (id, receiver)
    }

    /// Forget a connection and return how many remain. Its receiver should
    /// be dropped by the caller.
    pub async fn leave(&self, id: &ConnectionId) -> usize {
        let mut connections = self.connections.write().await;
        connections.remove(id);
        connections.len()
    }

    /// Send to every live connection.
    pub fn broadcast(&self, text: impl Into<Arc<str>>) {
        self.send(Envelope {
            text: text.into(),
            except: None,
        });
    }

    /// Send to every live connection except `except`.
    pub fn broadcast_except(&self, text: impl Into<Arc<str>>, except: ConnectionId) {
        self.send(Envelope {
            text: text.into(),
            except: Some(except),
        });
    }

    fn send(&self, envelope: Envelope) {
        // No receivers is fine: nobody is connected.
        let _ = self.sender.send(envelope);
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

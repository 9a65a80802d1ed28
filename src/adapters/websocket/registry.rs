//! Session registry: maps a client's declared identity to its live
//! connection, so a change can skip the client that caused it.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::hub::ConnectionId;
use crate::ports::ClientIdentity;

/// Identity to connection map.
///
/// One entry per identity. A second connection under the same identity
/// replaces the first; the first stays connected and keeps receiving
/// broadcasts, it is just no longer the one excluded as originator.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<ClientIdentity, ConnectionId>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `connection` for `identity`, returning the entry it replaced.
    pub async fn register(
        &self,
        identity: ClientIdentity,
        connection: ConnectionId,
    ) -> Option<ConnectionId> {
        self.sessions.write().await.insert(identity, connection)
    }

    /// Remove the entry for `identity` only if it still points at `connection`.
    ///
    /// Returns true when an entry was removed.
    pub async fn unregister(&self, identity: &ClientIdentity, connection: ConnectionId) -> bool {
        let mut sessions = self.sessions.write().await;
        if sessions.get(identity) == Some(&connection) {
            sessions.remove(identity);
            return true;
        }
        false
    }

    pub async fn resolve(&self, identity: &ClientIdentity) -> Option<ConnectionId> {
        self.sessions.read().await.get(identity).copied()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

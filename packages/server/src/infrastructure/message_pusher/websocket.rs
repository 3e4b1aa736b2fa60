//! WebSocket-backed [`MessagePusher`] implementation.
//!
//! Owns the map of connection ids to outbound channels. The WebSocket
//! itself is created in the UI layer; this implementation only receives the
//! `UnboundedSender` half and uses it for delivery, keeping "socket
//! lifecycle" and "event delivery" separate.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

/// Delivery over the per-connection WebSocket writer channels.
pub struct WebSocketMessagePusher {
    /// Outbound channel per live connection.
    connections: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Number of currently registered connections; test hook.
    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register(&self, connection: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        connections.insert(connection, sender);
        tracing::debug!(%connection, "connection registered with pusher");
    }

    async fn unregister(&self, connection: ConnectionId) {
        let mut connections = self.connections.lock().await;
        connections.remove(&connection);
        tracing::debug!(%connection, "connection unregistered from pusher");
    }

    async fn push_to(
        &self,
        connection: ConnectionId,
        payload: &str,
    ) -> Result<(), MessagePushError> {
        let connections = self.connections.lock().await;
        let sender = connections
            .get(&connection)
            .ok_or(MessagePushError::UnknownConnection(connection))?;
        sender
            .send(payload.to_string())
            .map_err(|_| MessagePushError::ChannelClosed(connection))
    }

    async fn broadcast(&self, targets: Vec<ConnectionId>, payload: &str) {
        let connections = self.connections.lock().await;
        for target in targets {
            match connections.get(&target) {
                Some(sender) => {
                    if sender.send(payload.to_string()).is_err() {
                        tracing::warn!(connection = %target, "broadcast target channel closed");
                    }
                }
                None => {
                    // The target disconnected between the membership
                    // snapshot and delivery; skip it.
                    tracing::debug!(connection = %target, "broadcast target already gone");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test]
    async fn test_push_to_delivers_to_the_registered_channel() {
        // given:
        let pusher = WebSocketMessagePusher::new();
        let conn = ConnectionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register(conn, tx).await;

        // when:
        pusher.push_to(conn, "payload").await.unwrap();

        // then:
        assert_eq!(rx.recv().await.unwrap(), "payload");
    }

    #[tokio::test]
    async fn test_push_to_unknown_connection_fails() {
        // given:
        let pusher = WebSocketMessagePusher::new();
        let conn = ConnectionId::generate();

        // when:
        let result = pusher.push_to(conn, "payload").await;

        // then:
        assert!(matches!(
            result,
            Err(MessagePushError::UnknownConnection(_))
        ));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_target() {
        // given:
        let pusher = WebSocketMessagePusher::new();
        let mut receivers = Vec::new();
        let mut targets = Vec::new();
        for _ in 0..3 {
            let conn = ConnectionId::generate();
            let (tx, rx) = mpsc::unbounded_channel();
            pusher.register(conn, tx).await;
            receivers.push(rx);
            targets.push(conn);
        }

        // when:
        pusher.broadcast(targets, "hello").await;

        // then:
        for rx in &mut receivers {
            assert_eq!(rx.recv().await.unwrap(), "hello");
        }
    }

    #[tokio::test]
    async fn test_broadcast_skips_dead_targets_without_failing() {
        // given: one live target and one that was never registered
        let pusher = WebSocketMessagePusher::new();
        let live = ConnectionId::generate();
        let gone = ConnectionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register(live, tx).await;

        // when:
        pusher.broadcast(vec![gone, live], "hello").await;

        // then:
        assert_eq!(rx.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        // given:
        let pusher = WebSocketMessagePusher::new();
        let conn = ConnectionId::generate();
        let (tx, _rx) = mpsc::unbounded_channel();
        pusher.register(conn, tx).await;

        // when:
        pusher.unregister(conn).await;
        pusher.unregister(conn).await;

        // then:
        assert!(matches!(
            pusher.push_to(conn, "x").await,
            Err(MessagePushError::UnknownConnection(_))
        ));
    }
}

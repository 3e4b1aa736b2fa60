//! Message delivery interface.
//!
//! A `MessagePusher` owns the per-connection outbound channels. The use
//! cases address connections only by [`ConnectionId`]; the WebSocket
//! plumbing that created the channel lives in the UI layer.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

/// Opaque identifier of one live connection. Two connections of the same
/// user are distinct: a broadcast addressed to one must never reach a
/// stale channel of the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound channel for one connection; the receiving half is drained by
/// the connection's writer task.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Failures while delivering to a connection.
#[derive(Debug, Error)]
pub enum MessagePushError {
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),
    #[error("connection {0} channel is closed")]
    ChannelClosed(ConnectionId),
}

/// Delivery of serialized server events to live connections.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register a connection's outbound channel.
    async fn register(&self, connection: ConnectionId, sender: PusherChannel);

    /// Remove a connection's outbound channel. Idempotent.
    async fn unregister(&self, connection: ConnectionId);

    /// Deliver an event to a single connection.
    async fn push_to(&self, connection: ConnectionId, payload: &str)
    -> Result<(), MessagePushError>;

    /// Deliver an event to every listed connection. Delivery failures for
    /// individual targets are logged and skipped, never propagated: one
    /// dead connection must not block the rest of the room.
    async fn broadcast(&self, targets: Vec<ConnectionId>, payload: &str);
}

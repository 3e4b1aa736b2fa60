//! UseCase: connection teardown.
//!
//! Removes the connection from every room it had joined and drops its
//! outbound channel. Idempotent: close can be triggered by several
//! underlying events (client close frame, read error, writer failure) and
//! running the teardown twice must leave the same state.

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher};
use crate::infrastructure::RoomRegistry;

pub struct DisconnectUseCase {
    registry: Arc<RoomRegistry>,
    pusher: Arc<dyn MessagePusher>,
}

impl DisconnectUseCase {
    pub fn new(registry: Arc<RoomRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { registry, pusher }
    }

    pub async fn execute(&self, connection: ConnectionId) {
        self.registry.leave_all(connection).await;
        self.pusher.unregister(connection).await;
        tracing::info!(%connection, "connection removed from all rooms");
    }
}

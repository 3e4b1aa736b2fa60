//! UseCase: join an assignment chat room.
//!
//! Registers the connection's membership, then fetches the room's history
//! and delivers it only to the requesting connection, oldest first. Mock
//! rooms always produce an empty history. A history read failure degrades
//! to an empty history rather than failing the join: chat is additive UI,
//! and a missing backlog should not keep the room closed.

use std::sync::Arc;

use helpmate_shared::protocol::ServerEvent;
use helpmate_shared::room::RoomId;

use crate::domain::{ConnectionId, MessagePusher, MessageRepository};
use crate::infrastructure::RoomRegistry;

use super::encode_event;
use super::error::JoinError;

pub struct JoinRoomUseCase {
    registry: Arc<RoomRegistry>,
    repository: Arc<dyn MessageRepository>,
    pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    pub fn new(
        registry: Arc<RoomRegistry>,
        repository: Arc<dyn MessageRepository>,
        pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            repository,
            pusher,
        }
    }

    /// Join `connection` to the room named by `raw_room_id` and deliver the
    /// history snapshot to it.
    pub async fn execute(
        &self,
        connection: ConnectionId,
        raw_room_id: &str,
    ) -> Result<(), JoinError> {
        let room: RoomId = raw_room_id.parse()?;

        self.registry.join(room.clone(), connection).await;
        tracing::info!(%connection, %room, "connection joined room");

        let messages = match self.repository.history(&room).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(%room, "failed to fetch chat history, degrading to empty: {e}");
                Vec::new()
            }
        };

        let event = ServerEvent::ChatHistory {
            assignment_id: room.to_string(),
            messages: messages.into_iter().map(Into::into).collect(),
        };
        if let Err(e) = self.pusher.push_to(connection, &encode_event(&event)).await {
            // The connection may have raced away between join and delivery.
            tracing::warn!(%connection, "failed to deliver chat history: {e}");
        }

        Ok(())
    }
}

//! UseCase: send a message to an assignment chat room.
//!
//! Classifies the assignment id once, persists the message (or synthesizes
//! an ephemeral record for mock rooms), then broadcasts the resulting
//! message to every connection currently in the room, including the sender.
//! The sender sees its own message arrive through the same broadcast as
//! everyone else; there is no separate echo path.
//!
//! Membership is NOT a precondition for sending: a connection may send to a
//! room it never joined and the broadcast still reaches that room's
//! members. This is a deliberate policy (it keeps reconnection simple) and
//! such sends are only noted at debug level.

use std::sync::Arc;

use helpmate_shared::protocol::ServerEvent;
use helpmate_shared::room::RoomId;

use crate::domain::{ConnectionId, MessageBody, MessagePusher, MessageRepository, UserId};
use crate::infrastructure::RoomRegistry;

use super::encode_event;
use super::error::SendError;

pub struct SendMessageUseCase {
    registry: Arc<RoomRegistry>,
    repository: Arc<dyn MessageRepository>,
    pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
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

    /// Persist and broadcast one message from `sender`.
    pub async fn execute(
        &self,
        connection: ConnectionId,
        sender: UserId,
        raw_room_id: &str,
        raw_body: &str,
    ) -> Result<(), SendError> {
        let room: RoomId = raw_room_id.parse()?;
        let body = MessageBody::new(raw_body.to_string())?;

        if !self.registry.is_member(&room, connection).await {
            tracing::debug!(%connection, %room, "send from a connection that never joined");
        }

        // A persistence failure means no broadcast: unpersisted durable
        // messages are never partially delivered.
        let message = self.repository.append(&room, sender, body).await?;

        // Membership is re-read after the persistence await; it may have
        // changed while the write was in flight.
        let members = self.registry.members(&room).await;
        if members.is_empty() {
            // A room with no current members is not an error.
            tracing::debug!(%room, "no connections in room, broadcast is a no-op");
            return Ok(());
        }

        let payload = encode_event(&ServerEvent::NewMessage(message.into()));
        self.pusher.broadcast(members, &payload).await;
        tracing::info!(%connection, sender = %sender, %room, "message broadcast to room");

        Ok(())
    }
}

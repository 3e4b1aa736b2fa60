//! Domain entities.

use helpmate_shared::room::RoomId;

use super::value_object::{MessageBody, Timestamp, UserId};

/// A chat message belonging to one assignment room.
///
/// For durable rooms, `message_id` and `created_at` are assigned by the
/// store at write time and are never client-supplied. For mock rooms they
/// are synthesized when the message is relayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub message_id: i64,
    pub room: RoomId,
    pub sender: UserId,
    pub body: MessageBody,
    pub created_at: Timestamp,
}

impl ChatMessage {
    pub fn new(
        message_id: i64,
        room: RoomId,
        sender: UserId,
        body: MessageBody,
        created_at: Timestamp,
    ) -> Self {
        Self {
            message_id,
            room,
            sender,
            body,
            created_at,
        }
    }
}

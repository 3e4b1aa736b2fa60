//! Conversions between domain entities and wire DTOs.

use helpmate_shared::protocol::WireMessage;

use crate::domain::ChatMessage;

impl From<ChatMessage> for WireMessage {
    fn from(message: ChatMessage) -> Self {
        Self {
            message_id: message.message_id,
            assignment_id: message.room.to_string(),
            sender_id: message.sender.value(),
            message: message.body.into_string(),
            created_at: message.created_at.value(),
        }
    }
}

//! Wire protocol for the chat WebSocket.
//!
//! All frames are JSON text messages tagged with a `type` field. Client
//! events mirror the original marketplace UI (`joinAssignmentChat`,
//! `sendMessage`); server events are the history snapshot delivered to the
//! joining connection, the `newMessage` broadcast, and per-connection
//! `chatError` reports.

use serde::{Deserialize, Serialize};

/// A chat message as it travels on the wire.
///
/// For durable rooms `message_id` and `created_at` are assigned by the
/// store; for mock rooms they are synthesized at send time. `created_at` is
/// a Unix timestamp in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub message_id: i64,
    pub assignment_id: String,
    pub sender_id: i64,
    pub message: String,
    pub created_at: i64,
}

/// Events sent by the client over the WebSocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Join the chat room for an assignment and request its history.
    #[serde(rename = "joinAssignmentChat")]
    JoinAssignmentChat { assignment_id: String },
    /// Send a message to an assignment's room.
    #[serde(rename = "sendMessage")]
    SendMessage {
        assignment_id: String,
        message: String,
    },
}

/// Events sent by the server over the WebSocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Message history for a room, delivered only to the joining
    /// connection, oldest first. Always empty for mock rooms.
    #[serde(rename = "chatHistory")]
    ChatHistory {
        assignment_id: String,
        messages: Vec<WireMessage>,
    },
    /// A message broadcast to every connection currently in the room,
    /// including the sender.
    #[serde(rename = "newMessage")]
    NewMessage(WireMessage),
    /// A recoverable error reported only to the originating connection.
    #[serde(rename = "chatError")]
    ChatError { message: String },
}

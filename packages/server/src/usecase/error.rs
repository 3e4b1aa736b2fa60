//! Use-case error taxonomy.
//!
//! All of these are recoverable, connection-scoped failures: the offending
//! connection may receive a `chatError` report, other connections and rooms
//! are never affected, and the process never crashes on them.

use helpmate_shared::room::RoomIdError;
use thiserror::Error;

use crate::domain::{RepositoryError, ValueError};

/// Failures while joining a room.
#[derive(Debug, Error)]
pub enum JoinError {
    /// Missing/empty assignment id: a client-error class, logged and
    /// otherwise silent (matches the relay's historical behavior).
    #[error("join requested without an assignment id")]
    MissingRoomId,
    /// The id is neither a durable assignment nor a mock room.
    #[error("'{0}' does not name a chat room")]
    InvalidRoomId(String),
}

impl JoinError {
    /// The human-readable report sent back to the offending connection,
    /// if any.
    pub fn client_report(&self) -> Option<String> {
        match self {
            JoinError::MissingRoomId => None,
            JoinError::InvalidRoomId(_) => Some("Failed to join chat room.".to_string()),
        }
    }
}

impl From<RoomIdError> for JoinError {
    fn from(err: RoomIdError) -> Self {
        match err {
            RoomIdError::Empty => JoinError::MissingRoomId,
            RoomIdError::Invalid(raw) => JoinError::InvalidRoomId(raw),
        }
    }
}

/// Failures while sending a message.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("send requested without an assignment id")]
    MissingRoomId,
    #[error("'{0}' does not name a chat room")]
    InvalidRoomId(String),
    #[error("invalid message body: {0}")]
    InvalidBody(#[from] ValueError),
    /// Durable persistence failed; the message was NOT broadcast.
    #[error("failed to persist message: {0}")]
    Store(#[from] RepositoryError),
}

impl SendError {
    /// The human-readable report sent back to the sender. Every send
    /// failure is reported; none is broadcast.
    pub fn client_report(&self) -> String {
        match self {
            SendError::MissingRoomId | SendError::InvalidRoomId(_) | SendError::InvalidBody(_) => {
                "Invalid message payload.".to_string()
            }
            SendError::Store(_) => "Failed to send message.".to_string(),
        }
    }
}

impl From<RoomIdError> for SendError {
    fn from(err: RoomIdError) -> Self {
        match err {
            RoomIdError::Empty => SendError::MissingRoomId,
            RoomIdError::Invalid(raw) => SendError::InvalidRoomId(raw),
        }
    }
}

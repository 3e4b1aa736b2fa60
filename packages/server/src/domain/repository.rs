//! Message store interface.
//!
//! The use-case layer depends on this trait; the infrastructure layer
//! provides the SQLite-backed implementation (dependency inversion). The
//! mock/durable split is part of the contract: an `append` or `history`
//! call for a mock room must never touch durable storage.

use async_trait::async_trait;
use helpmate_shared::room::RoomId;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use super::entity::ChatMessage;
use super::value_object::{MessageBody, UserId};

/// Failures raised by durable storage.
///
/// `append` failures are surfaced to the caller so an unpersisted message
/// is never broadcast; `history` failures are expected to be degraded to an
/// empty history by the caller.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// Durable read/write of chat messages keyed by assignment room.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a message and return it with the store-assigned id and
    /// timestamp. For mock rooms this is a pure, side-effect-free
    /// construction with a synthesized id and timestamp.
    async fn append(
        &self,
        room: &RoomId,
        sender: UserId,
        body: MessageBody,
    ) -> Result<ChatMessage, RepositoryError>;

    /// All messages for a room, ordered by creation time ascending. Always
    /// empty for mock rooms, regardless of prior sends.
    async fn history(&self, room: &RoomId) -> Result<Vec<ChatMessage>, RepositoryError>;
}

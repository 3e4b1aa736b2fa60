//! Use cases: the room-routing operations invoked by the WebSocket
//! handler. Each use case depends only on the domain interfaces plus the
//! room registry, so tests can run them against in-memory implementations.

pub mod disconnect;
pub mod error;
pub mod join_room;
pub mod send_message;

pub use disconnect::DisconnectUseCase;
pub use error::{JoinError, SendError};
pub use join_room::JoinRoomUseCase;
pub use send_message::SendMessageUseCase;

use helpmate_shared::protocol::ServerEvent;

/// Serialize a server event to its wire form. Serialization of these plain
/// data types cannot fail; the error arm exists to keep `unwrap` out of the
/// relay path.
pub(crate) fn encode_event(event: &ServerEvent) -> String {
    serde_json::to_string(event).unwrap_or_else(|e| {
        tracing::error!("failed to encode server event: {e}");
        String::new()
    })
}

//! Message store implementations.
//!
//! `sqlite` is the durable store used in production; `inmemory` mirrors its
//! semantics for tests. Both special-case mock rooms identically: a mock
//! append is a pure construction and a mock history is always empty.

pub mod inmemory;
pub mod sqlite;

pub use inmemory::InMemoryMessageRepository;
pub use sqlite::SqliteMessageRepository;

use helpmate_shared::room::RoomId;

use crate::domain::{ChatMessage, MessageBody, Timestamp, UserId};

/// Synthesize the ephemeral message echoed for a mock room. The wall-clock
/// timestamp doubles as the locally-unique message id, matching the
/// behavior clients already rely on.
pub(crate) fn synthesize_mock_message(
    room: &RoomId,
    sender: UserId,
    body: MessageBody,
    now_millis: i64,
) -> ChatMessage {
    ChatMessage::new(
        now_millis,
        room.clone(),
        sender,
        body,
        Timestamp::new(now_millis),
    )
}

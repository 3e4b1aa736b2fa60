//! Room identifier classification.
//!
//! Chat rooms are keyed by assignment ids, which come in two disjoint
//! flavors: durable ids (a row in the assignment store, messages persisted)
//! and mock ids (client-synthesized `MOCK_CHAT_ROOM_<suffix>` rooms created
//! optimistically before a backend assignment is confirmed, never
//! persisted). The classification happens once here, at the boundary where
//! the raw string is received; every later call site works with the tagged
//! [`RoomId`] instead of re-sniffing the string.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Reserved prefix marking a client-synthesized, non-persisted chat room.
pub const MOCK_ROOM_PREFIX: &str = "MOCK_CHAT_ROOM_";

/// A classified assignment identifier naming a chat room.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoomId {
    /// Assignment row in durable storage; messages under this id are persisted.
    Durable(i64),
    /// Optimistic client-side room; messages are echoed but never stored.
    /// Holds the full raw identifier including the prefix so the wire
    /// representation round-trips unchanged.
    Mock(String),
}

/// Reasons an incoming assignment identifier cannot name a room.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomIdError {
    /// The identifier was missing or empty.
    #[error("assignment id is missing or empty")]
    Empty,
    /// The identifier is neither an integer nor a mock-prefixed string.
    #[error("assignment id '{0}' is neither a durable id nor a mock room id")]
    Invalid(String),
}

impl RoomId {
    /// Build the mock room id a client uses for a task before the backend
    /// has confirmed a durable assignment.
    pub fn mock_for_task(task_id: i64) -> Self {
        RoomId::Mock(format!("{MOCK_ROOM_PREFIX}{task_id}"))
    }

    /// Whether this room is a non-persisted mock room.
    pub fn is_mock(&self) -> bool {
        matches!(self, RoomId::Mock(_))
    }
}

impl FromStr for RoomId {
    type Err = RoomIdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(RoomIdError::Empty);
        }
        if raw.starts_with(MOCK_ROOM_PREFIX) {
            return Ok(RoomId::Mock(raw.to_string()));
        }
        raw.parse::<i64>()
            .map(RoomId::Durable)
            .map_err(|_| RoomIdError::Invalid(raw.to_string()))
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomId::Durable(id) => write!(f, "{id}"),
            RoomId::Mock(raw) => f.write_str(raw),
        }
    }
}

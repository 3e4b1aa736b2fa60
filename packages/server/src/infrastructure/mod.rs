//! Infrastructure layer: concrete implementations of the domain
//! interfaces, the process-local room registry, and DTO conversions.

pub mod dto;
pub mod message_pusher;
pub mod registry;
pub mod repository;

pub use message_pusher::WebSocketMessagePusher;
pub use registry::RoomRegistry;
pub use repository::{InMemoryMessageRepository, SqliteMessageRepository};

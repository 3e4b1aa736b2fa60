//! Domain layer: entities, value objects and the interfaces the use cases
//! depend on. Concrete implementations live in the infrastructure layer
//! (dependency inversion).

pub mod entity;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use entity::ChatMessage;
pub use pusher::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};
pub use repository::{MessageRepository, RepositoryError};
pub use value_object::{MessageBody, Timestamp, UserId, ValueError};

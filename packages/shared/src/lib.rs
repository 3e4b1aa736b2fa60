//! Shared building blocks for the Helpmate chat core.
//!
//! Everything here is used by both the server and the client: the wire
//! protocol spoken over the WebSocket, the room-id classification that keeps
//! mock and durable assignments apart, and small runtime utilities (clock,
//! logging setup).

pub mod logger;
pub mod protocol;
pub mod room;
pub mod time;

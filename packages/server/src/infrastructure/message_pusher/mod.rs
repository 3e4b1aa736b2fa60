//! Message delivery implementations.
//!
//! `websocket` is the in-process implementation backed by the per-connection
//! outbound channels. A multi-process deployment would replace this with a
//! shared fan-out (pub/sub) behind the same trait.

pub mod websocket;

pub use websocket::WebSocketMessagePusher;

//! Helpmate chat client library.
//!
//! [`session::ChatSession`] is the consumer-facing contract UI-driving code
//! uses to join an assignment room, send messages and receive history and
//! broadcasts; `runner` wraps it into a reconnecting CLI chat loop.

pub mod domain;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
mod ui;

pub use error::ClientError;
pub use runner::run_client;
pub use session::{ChatSession, SessionEvent};

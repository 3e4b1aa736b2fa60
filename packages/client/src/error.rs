//! Client-side error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server refused the credential on the handshake. Not retryable
    /// with the same token.
    #[error("authentication failed, the server refused the credential")]
    AuthRejected,
    /// Transport-level failure (connect, read or write).
    #[error("connection error: {0}")]
    ConnectionError(String),
    /// A message was sent before any room was joined in this session.
    #[error("no chat room joined in this session")]
    NoActiveRoom,
    /// The server answered a request with a chatError report.
    #[error("chat error from server: {0}")]
    ChatRejected(String),
}

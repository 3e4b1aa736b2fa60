//! Value objects of the chat domain.
//!
//! Validation happens once, at construction; the rest of the code can then
//! rely on a `MessageBody` never being empty and never exceeding the
//! capacity limit.

use std::fmt;

use thiserror::Error;

/// Maximum length of a chat message body in bytes.
pub const MAX_MESSAGE_BODY_BYTES: usize = 4096;

/// Validation failures when constructing a value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("message body is empty")]
    EmptyBody,
    #[error("message body exceeds {MAX_MESSAGE_BODY_BYTES} bytes")]
    BodyTooLong,
}

/// Identifier of a marketplace user, resolved from a verified credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The text of a chat message. Guaranteed non-empty after trimming and
/// within the capacity limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody(String);

impl MessageBody {
    pub fn new(body: String) -> Result<Self, ValueError> {
        if body.trim().is_empty() {
            return Err(ValueError::EmptyBody);
        }
        if body.len() > MAX_MESSAGE_BODY_BYTES {
            return Err(ValueError::BodyTooLong);
        }
        Ok(Self(body))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_body_accepts_ordinary_text() {
        // when:
        let body = MessageBody::new("hello".to_string());

        // then:
        assert_eq!(body.unwrap().as_str(), "hello");
    }

    #[test]
    fn test_message_body_rejects_empty_string() {
        // when:
        let result = MessageBody::new(String::new());

        // then:
        assert_eq!(result.unwrap_err(), ValueError::EmptyBody);
    }

    #[test]
    fn test_message_body_rejects_whitespace_only_string() {
        // when:
        let result = MessageBody::new("   \n".to_string());

        // then:
        assert_eq!(result.unwrap_err(), ValueError::EmptyBody);
    }

    #[test]
    fn test_message_body_rejects_oversized_string() {
        // given:
        let oversized = "x".repeat(MAX_MESSAGE_BODY_BYTES + 1);

        // when:
        let result = MessageBody::new(oversized);

        // then:
        assert_eq!(result.unwrap_err(), ValueError::BodyTooLong);
    }

    #[test]
    fn test_timestamps_order_by_value() {
        // given:
        let earlier = Timestamp::new(1000);
        let later = Timestamp::new(2000);

        // then:
        assert!(earlier < later);
    }
}

//! In-memory message repository.
//!
//! Mirrors the SQLite implementation's semantics (monotonic ids,
//! server-assigned timestamps, mock rooms never stored) without a database.
//! Used by unit and integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use helpmate_shared::room::RoomId;
use helpmate_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, MessageBody, MessageRepository, RepositoryError, Timestamp, UserId,
};

use super::synthesize_mock_message;

pub struct InMemoryMessageRepository {
    messages: Mutex<Vec<ChatMessage>>,
    next_id: AtomicI64,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            clock,
        }
    }

    /// Number of stored (durable) messages; test hook.
    pub async fn stored_count(&self) -> usize {
        self.messages.lock().await.len()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(
        &self,
        room: &RoomId,
        sender: UserId,
        body: MessageBody,
    ) -> Result<ChatMessage, RepositoryError> {
        if room.is_mock() {
            return Ok(synthesize_mock_message(
                room,
                sender,
                body,
                self.clock.now_millis(),
            ));
        }

        let message = ChatMessage::new(
            self.next_id.fetch_add(1, Ordering::SeqCst),
            room.clone(),
            sender,
            body,
            Timestamp::new(self.clock.now_millis()),
        );
        self.messages.lock().await.push(message.clone());
        Ok(message)
    }

    async fn history(&self, room: &RoomId) -> Result<Vec<ChatMessage>, RepositoryError> {
        if room.is_mock() {
            return Ok(Vec::new());
        }
        let messages = self.messages.lock().await;
        let mut history: Vec<ChatMessage> = messages
            .iter()
            .filter(|m| &m.room == room)
            .cloned()
            .collect();
        history.sort_by_key(|m| (m.created_at, m.message_id));
        Ok(history)
    }
}

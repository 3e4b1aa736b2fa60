//! SQLite-backed message repository.
//!
//! One `chat_messages` table; `message_id` and `created_at` are assigned
//! here at write time (AUTOINCREMENT primary key, server clock), never
//! taken from the client. Mock rooms bypass the database entirely.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use helpmate_shared::room::RoomId;
use helpmate_shared::time::{Clock, SystemClock};
use rusqlite::{Connection, params};
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, MessageBody, MessageRepository, RepositoryError, Timestamp, UserId,
};

use super::synthesize_mock_message;

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        RepositoryError::Storage(err.to_string())
    }
}

/// Durable message store on a single SQLite connection.
pub struct SqliteMessageRepository {
    conn: Mutex<Connection>,
    clock: Arc<dyn Clock>,
}

impl SqliteMessageRepository {
    /// Open (or create) the database at `path` and ensure the schema
    /// exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, Arc::new(SystemClock))
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory(clock: Arc<dyn Clock>) -> Result<Self, RepositoryError> {
        Self::with_connection(Connection::open_in_memory()?, clock)
    }

    fn with_connection(conn: Connection, clock: Arc<dyn Clock>) -> Result<Self, RepositoryError> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            clock,
        })
    }
}

fn init_schema(conn: &Connection) -> Result<(), RepositoryError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS chat_messages (
            message_id    INTEGER PRIMARY KEY AUTOINCREMENT,
            assignment_id INTEGER NOT NULL,
            sender_id     INTEGER NOT NULL,
            body          TEXT NOT NULL,
            created_at    INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_chat_messages_assignment
            ON chat_messages (assignment_id, created_at);",
    )?;
    Ok(())
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn append(
        &self,
        room: &RoomId,
        sender: UserId,
        body: MessageBody,
    ) -> Result<ChatMessage, RepositoryError> {
        let assignment_id = match room {
            RoomId::Durable(id) => *id,
            RoomId::Mock(_) => {
                tracing::debug!(room = %room, "mock room, message not persisted");
                return Ok(synthesize_mock_message(
                    room,
                    sender,
                    body,
                    self.clock.now_millis(),
                ));
            }
        };

        let created_at = self.clock.now_millis();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO chat_messages (assignment_id, sender_id, body, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![assignment_id, sender.value(), body.as_str(), created_at],
        )?;
        let message_id = conn.last_insert_rowid();

        Ok(ChatMessage::new(
            message_id,
            room.clone(),
            sender,
            body,
            Timestamp::new(created_at),
        ))
    }

    async fn history(&self, room: &RoomId) -> Result<Vec<ChatMessage>, RepositoryError> {
        let assignment_id = match room {
            RoomId::Durable(id) => *id,
            RoomId::Mock(_) => return Ok(Vec::new()),
        };

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT message_id, sender_id, body, created_at
             FROM chat_messages
             WHERE assignment_id = ?1
             ORDER BY created_at ASC, message_id ASC",
        )?;
        let rows = stmt.query_map(params![assignment_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut messages = Vec::new();
        for row in rows {
            let (message_id, sender_id, body, created_at) = row?;
            let body = MessageBody::new(body)
                .map_err(|e| RepositoryError::Storage(format!("corrupt message body: {e}")))?;
            messages.push(ChatMessage::new(
                message_id,
                room.clone(),
                UserId::new(sender_id),
                body,
                Timestamp::new(created_at),
            ));
        }
        Ok(messages)
    }
}

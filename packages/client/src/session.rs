//! Chat session façade.
//!
//! Wraps the WebSocket transport into the contract UI-driving code works
//! with: connect-and-authenticate in one step, join a room and get its
//! history back, send to the current room, and receive broadcasts as a
//! typed event stream. The session tracks a single current room (one chat
//! panel at a time), though the server itself supports multiple concurrent
//! joins per connection.
//!
//! The session also carries the optimistic mock-room flow: a room created
//! as `MOCK_CHAT_ROOM_<task>` before the backend confirms an assignment
//! can later be promoted to the durable room via [`ChatSession::promote_room`],
//! which discards the mock room's client-side state. The two ids are never
//! unified server-side.

use std::collections::VecDeque;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use helpmate_shared::protocol::{ClientEvent, ServerEvent, WireMessage};
use helpmate_shared::room::RoomId;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite};

use crate::error::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, tungstenite::Message>;

/// Events observed by the session consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// History snapshot for a joined room, oldest first.
    History {
        assignment_id: String,
        messages: Vec<WireMessage>,
    },
    /// A broadcast message, including echoes of this session's own sends.
    Message(WireMessage),
    /// A recoverable error reported by the server to this session only.
    Error(String),
    /// The server closed the connection.
    Closed,
}

/// Outbound half of a session: joins, sends and teardown.
pub struct SessionHandle {
    writer: WsWriter,
    current_room: Option<RoomId>,
    closed: bool,
}

/// Inbound half of a session: the typed event stream.
pub struct SessionEvents {
    rx: mpsc::UnboundedReceiver<SessionEvent>,
    pending: VecDeque<SessionEvent>,
}

/// An authenticated chat session.
pub struct ChatSession {
    handle: SessionHandle,
    events: SessionEvents,
}

impl ChatSession {
    /// Establish the transport and authenticate in one step. The
    /// credential is rejected before the connection exists, so an auth
    /// failure never leaves a half-open session behind.
    pub async fn connect(url: &str, token: &str) -> Result<Self, ClientError> {
        let request_url = credential_url(url, token);
        let (ws, _response) = match connect_async(&request_url).await {
            Ok(ok) => ok,
            Err(tungstenite::Error::Http(response))
                if response.status() == tungstenite::http::StatusCode::UNAUTHORIZED =>
            {
                return Err(ClientError::AuthRejected);
            }
            Err(e) => return Err(ClientError::ConnectionError(e.to_string())),
        };
        tracing::info!("connected to chat server");

        let (writer, reader) = ws.split();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(read_loop(reader, tx));

        Ok(Self {
            handle: SessionHandle {
                writer,
                current_room: None,
                closed: false,
            },
            events: SessionEvents {
                rx,
                pending: VecDeque::new(),
            },
        })
    }

    /// Join a room and wait until its (possibly empty) history has been
    /// delivered. Events racing ahead of the history are buffered and
    /// replayed through [`ChatSession::next_event`] afterwards.
    pub async fn join_room(&mut self, room: &RoomId) -> Result<Vec<WireMessage>, ClientError> {
        self.handle.request_join(room).await?;

        let wanted = room.to_string();
        loop {
            match self.events.rx.recv().await {
                None => {
                    return Err(ClientError::ConnectionError(
                        "connection closed before history arrived".to_string(),
                    ));
                }
                Some(SessionEvent::History {
                    assignment_id,
                    messages,
                }) if assignment_id == wanted => return Ok(messages),
                Some(SessionEvent::Error(message)) => {
                    return Err(ClientError::ChatRejected(message));
                }
                Some(event) => self.events.pending.push_back(event),
            }
        }
    }

    /// Send a message to the session's current room.
    pub async fn send_message(&mut self, body: &str) -> Result<(), ClientError> {
        self.handle.send_message(body).await
    }

    /// The room this session currently considers active.
    pub fn current_room(&self) -> Option<&RoomId> {
        self.handle.current_room.as_ref()
    }

    /// Reconcile an optimistic mock room with the confirmed durable
    /// assignment id: joins the durable room and discards any buffered
    /// state belonging to the mock room.
    pub async fn promote_room(
        &mut self,
        assignment_id: i64,
    ) -> Result<Vec<WireMessage>, ClientError> {
        if let Some(mock) = self
            .handle
            .current_room
            .as_ref()
            .filter(|room| room.is_mock())
            .map(ToString::to_string)
        {
            self.events.discard_room(&mock);
        }
        self.join_room(&RoomId::Durable(assignment_id)).await
    }

    /// Next session event, buffered events first.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.next().await
    }

    /// Tear the session down. Safe to call multiple times; the server
    /// removes the connection from every room it had joined.
    pub async fn disconnect(&mut self) {
        self.handle.disconnect().await;
    }

    /// Split into the outbound handle and the event stream, for consumers
    /// that drain events on a separate task (e.g. the CLI).
    pub fn split(self) -> (SessionHandle, SessionEvents) {
        (self.handle, self.events)
    }
}

impl SessionHandle {
    /// Fire a join request without waiting for history; the snapshot
    /// arrives as a [`SessionEvent::History`] on the event stream.
    pub async fn request_join(&mut self, room: &RoomId) -> Result<(), ClientError> {
        self.send_event(&ClientEvent::JoinAssignmentChat {
            assignment_id: room.to_string(),
        })
        .await?;
        self.current_room = Some(room.clone());
        Ok(())
    }

    /// Send a message to the current room.
    pub async fn send_message(&mut self, body: &str) -> Result<(), ClientError> {
        let room = self
            .current_room
            .clone()
            .ok_or(ClientError::NoActiveRoom)?;
        self.send_event(&ClientEvent::SendMessage {
            assignment_id: room.to_string(),
            message: body.to_string(),
        })
        .await
    }

    /// Close the transport. Idempotent.
    pub async fn disconnect(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.writer.send(tungstenite::Message::Close(None)).await {
            tracing::debug!("close frame not delivered: {e}");
        }
    }

    async fn send_event(&mut self, event: &ClientEvent) -> Result<(), ClientError> {
        let json = serde_json::to_string(event)
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
        self.writer
            .send(tungstenite::Message::Text(json.into()))
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))
    }
}

impl SessionEvents {
    /// Next session event, buffered events first.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        self.rx.recv().await
    }

    /// Drop buffered events that belong to the given room.
    fn discard_room(&mut self, assignment_id: &str) {
        self.pending.retain(|event| match event {
            SessionEvent::History {
                assignment_id: room,
                ..
            } => room != assignment_id,
            SessionEvent::Message(message) => message.assignment_id != assignment_id,
            _ => true,
        });
    }
}

/// Append the credential to the connection URL, keeping an existing query
/// string intact.
fn credential_url(url: &str, token: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}token={token}")
}

/// Drain server frames into typed session events.
async fn read_loop(
    mut reader: SplitStream<WsStream>,
    tx: mpsc::UnboundedSender<SessionEvent>,
) {
    while let Some(frame) = reader.next().await {
        match frame {
            Ok(tungstenite::Message::Text(text)) => {
                match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(ServerEvent::ChatHistory {
                        assignment_id,
                        messages,
                    }) => {
                        if tx
                            .send(SessionEvent::History {
                                assignment_id,
                                messages,
                            })
                            .is_err()
                        {
                            break;
                        }
                    }
                    Ok(ServerEvent::NewMessage(message)) => {
                        if tx.send(SessionEvent::Message(message)).is_err() {
                            break;
                        }
                    }
                    Ok(ServerEvent::ChatError { message }) => {
                        if tx.send(SessionEvent::Error(message)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("unrecognized server frame: {e}");
                    }
                }
            }
            Ok(tungstenite::Message::Close(_)) => {
                tracing::info!("server closed the connection");
                let _ = tx.send(SessionEvent::Closed);
                break;
            }
            Err(e) => {
                tracing::warn!("websocket read error: {e}");
                let _ = tx.send(SessionEvent::Closed);
                break;
            }
            _ => {}
        }
    }
}

//! WebSocket connection handlers.
//!
//! The connection lifecycle lives here: handshake, authentication, the
//! joined phase, and teardown. The credential travels as a `token` query
//! parameter on the upgrade request and is verified before the upgrade
//! completes, so a connection that has not authenticated structurally
//! cannot emit a room event. On auth failure the handshake is answered
//! with 401 and no connection state is ever created.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use helpmate_shared::protocol::{ClientEvent, ServerEvent};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::auth::{AUTH_TIMEOUT, AuthError, Identity};
use crate::domain::ConnectionId;
use crate::usecase::encode_event;

use super::super::state::AppState;

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Authentication gates everything else on this connection. The check
    // is bounded: if it does not resolve in time the connection is refused
    // rather than left hanging.
    let verifier = state.verifier.clone();
    let verified = tokio::time::timeout(AUTH_TIMEOUT, async move {
        verifier.verify(query.token.as_deref())
    })
    .await
    .unwrap_or(Err(AuthError::Timeout));

    let identity = match verified {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("socket auth failed: {e}");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    // Identity is bound to the connection here and never re-derived.
    let connection = ConnectionId::generate();

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, identity, connection)))
}

pub async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    identity: Identity,
    connection: ConnectionId,
) {
    // Registration happens only once the upgraded socket exists. A client
    // that abandons the handshake never reaches this point, so it leaves
    // no pusher state behind to clean up.
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.pusher.register(connection, tx).await;
    tracing::info!(user = %identity.user_id, %connection, "user connected");

    let (mut sender, mut receiver) = socket.split();

    // Task draining client frames into the use cases
    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!(%connection, "websocket error: {e}");
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_client_event(&recv_state, connection, identity, &text).await;
                }
                Message::Close(_) => {
                    tracing::info!(%connection, "client requested close");
                    break;
                }
                Message::Ping(_) => {
                    // Ping/pong is handled by the protocol layer.
                }
                _ => {}
            }
        }
    });

    // Task draining the outbound channel into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // If either task completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Teardown runs exactly once per connection on this path; the use case
    // itself is idempotent.
    state.disconnect.execute(connection).await;
    tracing::info!(user = %identity.user_id, %connection, "user disconnected");
}

/// Dispatch one parsed client frame. Every failure terminates here: it is
/// reported to the offending connection at most, and never reaches any
/// other connection or room.
async fn handle_client_event(
    state: &AppState,
    connection: ConnectionId,
    identity: Identity,
    text: &str,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(%connection, "unparseable client frame: {e}");
            report_error(state, connection, "Unrecognized chat event.").await;
            return;
        }
    };

    match event {
        ClientEvent::JoinAssignmentChat { assignment_id } => {
            if let Err(e) = state.join_room.execute(connection, &assignment_id).await {
                tracing::warn!(%connection, "join failed: {e}");
                if let Some(report) = e.client_report() {
                    report_error(state, connection, &report).await;
                }
            }
        }
        ClientEvent::SendMessage {
            assignment_id,
            message,
        } => {
            if let Err(e) = state
                .send_message
                .execute(connection, identity.user_id, &assignment_id, &message)
                .await
            {
                tracing::warn!(%connection, "send failed: {e}");
                report_error(state, connection, &e.client_report()).await;
            }
        }
    }
}

async fn report_error(state: &AppState, connection: ConnectionId, message: &str) {
    let payload = encode_event(&ServerEvent::ChatError {
        message: message.to_string(),
    });
    if state.pusher.push_to(connection, &payload).await.is_err() {
        tracing::debug!(%connection, "could not deliver chatError, connection gone");
    }
}

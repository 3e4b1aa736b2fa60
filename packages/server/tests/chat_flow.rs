//! End-to-end tests for the chat relay: an in-process server on an
//! ephemeral port, driven over real WebSockets.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite};

use helpmate_server::auth::{TokenVerifier, issue_token};
use helpmate_server::infrastructure::{
    InMemoryMessageRepository, RoomRegistry, WebSocketMessagePusher,
};
use helpmate_server::ui::Server;
use helpmate_server::usecase::{DisconnectUseCase, JoinRoomUseCase, SendMessageUseCase};
use helpmate_shared::protocol::{ClientEvent, ServerEvent};
use helpmate_shared::time::SystemClock;

const SECRET: &[u8] = b"integration-secret";
const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const QUIET_TIMEOUT: Duration = Duration::from_millis(300);

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Start a fully wired server on an ephemeral port; returns the ws URL
/// and a handle to the pusher so tests can observe connection state.
async fn start_server_with_pusher() -> (String, Arc<WebSocketMessagePusher>) {
    let verifier = Arc::new(TokenVerifier::new(SECRET));
    let repository = Arc::new(InMemoryMessageRepository::new(Arc::new(SystemClock)));
    let registry = Arc::new(RoomRegistry::new());
    let pusher = Arc::new(WebSocketMessagePusher::new());

    let join_room = Arc::new(JoinRoomUseCase::new(
        registry.clone(),
        repository.clone(),
        pusher.clone(),
    ));
    let send_message = Arc::new(SendMessageUseCase::new(
        registry.clone(),
        repository,
        pusher.clone(),
    ));
    let disconnect = Arc::new(DisconnectUseCase::new(registry, pusher.clone()));

    let server = Server::new(
        verifier,
        pusher.clone(),
        join_room,
        send_message,
        disconnect,
    );
    let router = server.router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("ws://{addr}/ws"), pusher)
}

async fn start_server() -> String {
    let (url, _pusher) = start_server_with_pusher().await;
    url
}

fn token_for(user_id: i64) -> String {
    issue_token(SECRET, user_id, Duration::from_secs(600))
}

async fn connect(url: &str, user_id: i64) -> WsClient {
    let (ws, _) = connect_async(format!("{url}?token={}", token_for(user_id)))
        .await
        .expect("connection should be accepted");
    ws
}

async fn send(ws: &mut WsClient, event: &ClientEvent) {
    let json = serde_json::to_string(event).unwrap();
    ws.send(tungstenite::Message::Text(json.into()))
        .await
        .unwrap();
}

/// Receive the next server event, skipping non-text frames.
async fn recv_event(ws: &mut WsClient) -> ServerEvent {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for a server event")
            .expect("stream ended unexpectedly")
            .expect("websocket error");
        if let tungstenite::Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// Assert that no further text frame arrives within the quiet window.
async fn assert_silent(ws: &mut WsClient) {
    let result = tokio::time::timeout(QUIET_TIMEOUT, ws.next()).await;
    assert!(
        result.is_err(),
        "expected no further events, got {result:?}"
    );
}

async fn join(ws: &mut WsClient, assignment_id: &str) -> Vec<helpmate_shared::protocol::WireMessage> {
    send(
        ws,
        &ClientEvent::JoinAssignmentChat {
            assignment_id: assignment_id.to_string(),
        },
    )
    .await;
    match recv_event(ws).await {
        ServerEvent::ChatHistory {
            assignment_id: room,
            messages,
        } => {
            assert_eq!(room, assignment_id);
            messages
        }
        other => panic!("expected chatHistory, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_or_invalid_credentials_are_refused() {
    let url = start_server().await;

    // no token at all
    assert!(connect_async(&url).await.is_err());

    // empty token
    assert!(connect_async(format!("{url}?token=")).await.is_err());

    // token signed with the wrong secret
    let forged = issue_token(b"wrong-secret", 42, Duration::from_secs(600));
    assert!(connect_async(format!("{url}?token={forged}")).await.is_err());

    // a valid credential still gets through
    let ws = connect_async(format!("{url}?token={}", token_for(42))).await;
    assert!(ws.is_ok());
}

#[tokio::test]
async fn join_durable_room_send_and_receive_own_broadcast() {
    // user 42 joins durable room "17" with empty history and sends "hello"
    let url = start_server().await;
    let mut ws = connect(&url, 42).await;

    let history = join(&mut ws, "17").await;
    assert!(history.is_empty());

    send(
        &mut ws,
        &ClientEvent::SendMessage {
            assignment_id: "17".to_string(),
            message: "hello".to_string(),
        },
    )
    .await;

    // the sender sees its own message via the same broadcast channel
    let ServerEvent::NewMessage(message) = recv_event(&mut ws).await else {
        panic!("expected newMessage");
    };
    assert_eq!(message.sender_id, 42);
    assert_eq!(message.assignment_id, "17");
    assert_eq!(message.message, "hello");
    assert!(message.message_id > 0);
    assert!(message.created_at > 0);
}

#[tokio::test]
async fn broadcast_reaches_every_room_member_exactly_once() {
    let url = start_server().await;
    let mut a = connect(&url, 1).await;
    let mut b = connect(&url, 2).await;
    let mut c = connect(&url, 3).await;
    join(&mut a, "17").await;
    join(&mut b, "17").await;
    join(&mut c, "17").await;

    send(
        &mut b,
        &ClientEvent::SendMessage {
            assignment_id: "17".to_string(),
            message: "hi all".to_string(),
        },
    )
    .await;

    for ws in [&mut a, &mut b, &mut c] {
        let ServerEvent::NewMessage(message) = recv_event(ws).await else {
            panic!("expected newMessage");
        };
        assert_eq!(message.sender_id, 2);
        assert_eq!(message.message, "hi all");
        assert_silent(ws).await;
    }
}

#[tokio::test]
async fn joining_twice_does_not_duplicate_delivery() {
    let url = start_server().await;
    let mut ws = connect(&url, 42).await;
    join(&mut ws, "17").await;
    join(&mut ws, "17").await;

    send(
        &mut ws,
        &ClientEvent::SendMessage {
            assignment_id: "17".to_string(),
            message: "once".to_string(),
        },
    )
    .await;

    let ServerEvent::NewMessage(message) = recv_event(&mut ws).await else {
        panic!("expected newMessage");
    };
    assert_eq!(message.message, "once");
    assert_silent(&mut ws).await;
}

#[tokio::test]
async fn mock_room_echoes_without_history_or_persistence() {
    // user 42 joins the optimistic room, sends "hi", gets an immediate
    // echo, and a later history fetch still comes back empty
    let url = start_server().await;
    let mut ws = connect(&url, 42).await;

    let history = join(&mut ws, "MOCK_CHAT_ROOM_9").await;
    assert!(history.is_empty());

    send(
        &mut ws,
        &ClientEvent::SendMessage {
            assignment_id: "MOCK_CHAT_ROOM_9".to_string(),
            message: "hi".to_string(),
        },
    )
    .await;

    let ServerEvent::NewMessage(message) = recv_event(&mut ws).await else {
        panic!("expected newMessage");
    };
    assert_eq!(message.assignment_id, "MOCK_CHAT_ROOM_9");
    assert_eq!(message.sender_id, 42);
    assert!(message.message_id > 0);
    assert!(message.created_at > 0);

    // a fresh join after the send: the mock room has no durable history
    let mut other = connect(&url, 7).await;
    let history = join(&mut other, "MOCK_CHAT_ROOM_9").await;
    assert!(history.is_empty());
}

#[tokio::test]
async fn disconnected_member_no_longer_receives_broadcasts() {
    let url = start_server().await;
    let mut a = connect(&url, 1).await;
    let mut b = connect(&url, 2).await;
    join(&mut a, "17").await;
    join(&mut b, "17").await;

    // A goes away; give the server time to run the teardown
    a.close(None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    send(
        &mut b,
        &ClientEvent::SendMessage {
            assignment_id: "17".to_string(),
            message: "anyone there?".to_string(),
        },
    )
    .await;

    // delivered to the remaining member only
    let ServerEvent::NewMessage(message) = recv_event(&mut b).await else {
        panic!("expected newMessage");
    };
    assert_eq!(message.message, "anyone there?");

    // a new connection for the same user starts clean: it receives the
    // durable history on join but no phantom deliveries meant for the old
    // connection
    let mut a2 = connect(&url, 1).await;
    let history = join(&mut a2, "17").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].message, "anyone there?");
    assert_silent(&mut a2).await;
}

#[tokio::test]
async fn invalid_payloads_produce_chat_errors_for_the_sender_only() {
    let url = start_server().await;
    let mut a = connect(&url, 1).await;
    let mut b = connect(&url, 2).await;
    join(&mut a, "17").await;
    join(&mut b, "17").await;

    // empty message body
    send(
        &mut a,
        &ClientEvent::SendMessage {
            assignment_id: "17".to_string(),
            message: String::new(),
        },
    )
    .await;
    let ServerEvent::ChatError { message } = recv_event(&mut a).await else {
        panic!("expected chatError");
    };
    assert_eq!(message, "Invalid message payload.");

    // the other member of the room saw nothing
    assert_silent(&mut b).await;
}

#[tokio::test]
async fn history_is_delivered_oldest_first() {
    let url = start_server().await;
    let mut sender = connect(&url, 42).await;
    join(&mut sender, "17").await;

    for text in ["one", "two", "three"] {
        send(
            &mut sender,
            &ClientEvent::SendMessage {
                assignment_id: "17".to_string(),
                message: text.to_string(),
            },
        )
        .await;
        // wait for the broadcast so the next insert lands strictly after
        let _ = recv_event(&mut sender).await;
    }

    let mut reader = connect(&url, 7).await;
    let history = join(&mut reader, "17").await;
    let bodies: Vec<&str> = history.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(bodies, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn abandoned_handshake_leaves_no_connection_state() {
    // a client that presents a valid credential but drops the TCP
    // connection before the upgrade completes must not leave a registered
    // connection behind
    let (url, pusher) = start_server_with_pusher().await;
    let addr = url
        .strip_prefix("ws://")
        .and_then(|rest| rest.strip_suffix("/ws"))
        .unwrap()
        .to_string();

    let mut stream = TcpStream::connect(&addr).await.unwrap();
    let request = format!(
        "GET /ws?token={} HTTP/1.1\r\n\
         Host: {addr}\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
         Sec-WebSocket-Version: 13\r\n\r\n",
        token_for(42)
    );
    stream.write_all(request.as_bytes()).await.unwrap();
    drop(stream);

    // give the server time to notice the dead transport and tear down
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(pusher.connection_count().await, 0);
}

//! Client execution logic with reconnection support.

use std::str::FromStr;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use helpmate_shared::room::RoomId;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use crate::domain::{should_attempt_reconnect, should_exit_immediately};
use crate::error::ClientError;
use crate::formatter::MessageFormatter;
use crate::session::{ChatSession, SessionEvent, SessionHandle};
use crate::ui::redisplay_prompt;

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

const PROMPT: &str = "chat> ";

/// Run the chat client with reconnection logic
pub async fn run_client(
    url: String,
    token: String,
    initial_room: Option<RoomId>,
) -> Result<(), ClientError> {
    let user_id = user_id_from_token(&token).unwrap_or_else(|| {
        tracing::warn!("could not read the user id from the token, own messages will not be marked");
        -1
    });

    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Connecting to {} (attempt {}/{})",
            url,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_chat_session(&url, &token, initial_room.as_ref(), user_id).await {
            Ok(_) => {
                tracing::info!("Chat session ended normally");
                break;
            }
            Err(e) => {
                if should_exit_immediately(&e) {
                    tracing::error!("{}", e);
                    return Err(e);
                }

                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if !should_attempt_reconnect(&e, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    return Err(e);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }

    Ok(())
}

/// Run one chat session until the user exits or the connection drops
async fn run_chat_session(
    url: &str,
    token: &str,
    initial_room: Option<&RoomId>,
    user_id: i64,
) -> Result<(), ClientError> {
    let mut session = ChatSession::connect(url, token).await?;

    println!(
        "\nConnected. Type messages and press Enter to send, '/join <assignment-id>' to switch rooms, Ctrl+C to exit.\n"
    );

    if let Some(room) = initial_room {
        let history = session.join_room(room).await?;
        let formatted = MessageFormatter::format_history(&room.to_string(), &history, user_id);
        print!("{}", formatted);
        redisplay_prompt(PROMPT);
    }

    let (handle, mut events) = session.split();

    // Drain server events onto the terminal
    let mut print_task = tokio::spawn(async move {
        let mut connection_error = false;

        while let Some(event) = events.next().await {
            match event {
                SessionEvent::History {
                    assignment_id,
                    messages,
                } => {
                    let formatted =
                        MessageFormatter::format_history(&assignment_id, &messages, user_id);
                    print!("{}", formatted);
                    redisplay_prompt(PROMPT);
                }
                SessionEvent::Message(message) => {
                    let formatted = MessageFormatter::format_chat_message(&message, user_id);
                    print!("{}", formatted);
                    redisplay_prompt(PROMPT);
                }
                SessionEvent::Error(message) => {
                    print!("{}", MessageFormatter::format_chat_error(&message));
                    redisplay_prompt(PROMPT);
                }
                SessionEvent::Closed => {
                    print!("{}", MessageFormatter::format_closed());
                    connection_error = true;
                    break;
                }
            }
        }

        connection_error
    });

    // Channel for rustyline input
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    // Blocking thread for rustyline (synchronous readline)
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    let mut write_task = tokio::spawn(input_loop(handle, input_rx));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut print_task => {
            write_task.abort();
            if read_result.unwrap_or(false) {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
        write_result = &mut write_task => {
            print_task.abort();
            if write_result.unwrap_or(false) {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
    }

    Ok(())
}

/// Forward terminal input to the session until the channel closes.
/// Returns `true` on a transport failure.
async fn input_loop(
    mut handle: SessionHandle,
    mut input_rx: mpsc::UnboundedReceiver<String>,
) -> bool {
    while let Some(line) = input_rx.recv().await {
        if let Some(raw_room) = line.strip_prefix("/join ") {
            match RoomId::from_str(raw_room) {
                Ok(room) => {
                    if let Err(e) = handle.request_join(&room).await {
                        tracing::warn!("Failed to join room: {}", e);
                        return true;
                    }
                }
                Err(e) => {
                    println!("Invalid room id: {}", e);
                    redisplay_prompt(PROMPT);
                }
            }
            continue;
        }

        match handle.send_message(&line).await {
            Ok(_) => {}
            Err(ClientError::NoActiveRoom) => {
                println!("Join a room first with '/join <assignment-id>'.");
                redisplay_prompt(PROMPT);
            }
            Err(e) => {
                tracing::warn!("Failed to send message: {}", e);
                return true;
            }
        }
    }

    handle.disconnect().await;
    false
}

/// Read the user id out of the token's claims without verifying the
/// signature. The server is the authority on the token, the client only
/// uses this to mark its own messages in the transcript.
fn user_id_from_token(token: &str) -> Option<i64> {
    let (claims_b64, _sig) = token.split_once('.')?;
    let claims_bytes = URL_SAFE_NO_PAD.decode(claims_b64).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&claims_bytes).ok()?;
    claims.get("sub")?.as_i64()
}

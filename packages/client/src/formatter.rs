//! Message formatting utilities for client display.

use helpmate_shared::protocol::WireMessage;
use helpmate_shared::time::timestamp_to_rfc3339;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a room's history snapshot, oldest first
    ///
    /// # Arguments
    ///
    /// * `assignment_id` - The room the history belongs to
    /// * `messages` - History messages, oldest first
    /// * `current_user_id` - The current user's id (to mark as "me")
    pub fn format_history(
        assignment_id: &str,
        messages: &[WireMessage],
        current_user_id: i64,
    ) -> String {
        let mut output = String::new();
        output.push_str("\n\n============================================================\n");
        output.push_str(&format!("Chat room {assignment_id}:\n"));

        if messages.is_empty() {
            output.push_str("(No messages yet)\n");
        } else {
            for message in messages {
                let is_me = message.sender_id == current_user_id;
                let me_suffix = if is_me { " (me)" } else { "" };
                let timestamp_str = timestamp_to_rfc3339(message.created_at);
                output.push_str(&format!(
                    "user {}{}: {} ({})\n",
                    message.sender_id, me_suffix, message.message, timestamp_str
                ));
            }
        }

        output.push_str("============================================================\n");
        output
    }

    /// Format a broadcast chat message
    pub fn format_chat_message(message: &WireMessage, current_user_id: i64) -> String {
        let who = if message.sender_id == current_user_id {
            "me".to_string()
        } else {
            format!("user {}", message.sender_id)
        };
        let timestamp_str = timestamp_to_rfc3339(message.created_at);
        format!(
            "\n\n------------------------------------------------------------\n\
             @{}: {}\n\
             sent at {}\n\
             ------------------------------------------------------------\n",
            who, message.message, timestamp_str
        )
    }

    /// Format a chatError report from the server
    pub fn format_chat_error(message: &str) -> String {
        format!("\n! chat error: {message}\n")
    }

    /// Format the connection-closed notice
    pub fn format_closed() -> String {
        "\n! connection closed by server\n".to_string()
    }
}

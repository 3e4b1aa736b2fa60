//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use helpmate_shared::room::RoomId;

use crate::error::ClientError;

/// Pick the room to chat in for a task.
///
/// Once the backend has confirmed an assignment, its durable id wins; until
/// then the client falls back to the optimistic mock room so the chat panel
/// can open without waiting for the server round-trip.
pub fn reconcile_room_id(backend_assignment_id: Option<i64>, task_id: i64) -> RoomId {
    match backend_assignment_id {
        Some(assignment_id) => RoomId::Durable(assignment_id),
        None => RoomId::mock_for_task(task_id),
    }
}

/// Check if the client should exit immediately based on the error type.
///
/// An auth rejection will not heal by retrying with the same credential.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(error, ClientError::AuthRejected)
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    if should_exit_immediately(error) {
        return false;
    }
    current_attempt < max_attempts
}

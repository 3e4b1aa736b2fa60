//! Shared application state handed to the endpoint handlers.

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::domain::MessagePusher;
use crate::usecase::{DisconnectUseCase, JoinRoomUseCase, SendMessageUseCase};

/// Shared application state
pub struct AppState {
    /// Credential verifier gating every connection
    pub verifier: Arc<TokenVerifier>,
    /// MessagePusher holding the per-connection outbound channels
    pub pusher: Arc<dyn MessagePusher>,
    /// UseCase for joining an assignment chat room
    pub join_room: Arc<JoinRoomUseCase>,
    /// UseCase for sending a message
    pub send_message: Arc<SendMessageUseCase>,
    /// UseCase for connection teardown
    pub disconnect: Arc<DisconnectUseCase>,
}

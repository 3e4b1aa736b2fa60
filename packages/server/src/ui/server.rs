//! Server wiring and execution.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::auth::TokenVerifier;
use crate::domain::MessagePusher;
use crate::usecase::{DisconnectUseCase, JoinRoomUseCase, SendMessageUseCase};

use super::{
    handler::{http::health_check, websocket::websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// The chat server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(verifier, pusher, join_room, send_message, disconnect);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(
        verifier: Arc<TokenVerifier>,
        pusher: Arc<dyn MessagePusher>,
        join_room: Arc<JoinRoomUseCase>,
        send_message: Arc<SendMessageUseCase>,
        disconnect: Arc<DisconnectUseCase>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                verifier,
                pusher,
                join_room,
                send_message,
                disconnect,
            }),
        }
    }

    /// The axum router for this server. Exposed so tests can serve it on
    /// an ephemeral port.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(websocket_handler))
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the chat server until shutdown.
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified
    /// address or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("chat server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

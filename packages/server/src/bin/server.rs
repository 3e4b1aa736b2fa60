//! Helpmate chat server binary.
//!
//! Authenticated WebSocket message relay for assignment chat rooms, backed
//! by SQLite for confirmed assignments.
//!
//! Run with:
//! ```not_rust
//! HELPMATE_JWT_SECRET=... cargo run --bin helpmate-server
//! HELPMATE_JWT_SECRET=... cargo run --bin helpmate-server -- --host 0.0.0.0 --port 3000 --db-path chat.db
//! ```

use std::sync::Arc;

use clap::Parser;

use helpmate_server::{
    auth::TokenVerifier,
    infrastructure::{RoomRegistry, SqliteMessageRepository, WebSocketMessagePusher},
    ui::Server,
    usecase::{DisconnectUseCase, JoinRoomUseCase, SendMessageUseCase},
};
use helpmate_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "helpmate-server")]
#[command(about = "Helpmate assignment chat server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "3000")]
    port: u16,

    /// Path of the SQLite database holding chat messages
    #[arg(short = 'd', long, default_value = "helpmate-chat.db")]
    db_path: String,

    /// Secret used to verify bearer credentials. Prefer the
    /// HELPMATE_JWT_SECRET environment variable over this flag.
    #[arg(long)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Process-wide configuration: loaded once, immutable thereafter.
    let secret = match std::env::var("HELPMATE_JWT_SECRET").ok().or(args.jwt_secret) {
        Some(secret) if !secret.is_empty() => secret,
        _ => {
            tracing::error!(
                "no credential secret configured; set HELPMATE_JWT_SECRET or pass --jwt-secret"
            );
            std::process::exit(1);
        }
    };
    let verifier = Arc::new(TokenVerifier::new(secret.into_bytes()));

    // Durable message store
    let repository = match SqliteMessageRepository::open(&args.db_path) {
        Ok(repository) => Arc::new(repository),
        Err(e) => {
            tracing::error!("failed to open message store at {}: {e}", args.db_path);
            std::process::exit(1);
        }
    };
    tracing::info!("message store ready at {}", args.db_path);

    // Room router state and delivery
    let registry = Arc::new(RoomRegistry::new());
    let pusher = Arc::new(WebSocketMessagePusher::new());

    // Use cases
    let join_room = Arc::new(JoinRoomUseCase::new(
        registry.clone(),
        repository.clone(),
        pusher.clone(),
    ));
    let send_message = Arc::new(SendMessageUseCase::new(
        registry.clone(),
        repository.clone(),
        pusher.clone(),
    ));
    let disconnect = Arc::new(DisconnectUseCase::new(registry, pusher.clone()));

    let server = Server::new(verifier, pusher, join_room, send_message, disconnect);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

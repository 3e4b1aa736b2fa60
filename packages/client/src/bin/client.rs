//! CLI chat client for the Helpmate assignment chat server.
//!
//! Connects with a signed token, optionally joins an assignment room right
//! away, and relays stdin lines as chat messages. Broadcasts and history
//! snapshots are printed to the terminal. Automatically reconnects on
//! disconnection (max 5 attempts with 5 second interval); an authentication
//! rejection exits immediately.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin helpmate-client -- --token <token> --assignment-id 17
//! cargo run --bin helpmate-client -- --token <token> --task-id 9
//! ```

use clap::Parser;

use helpmate_client::domain::reconcile_room_id;
use helpmate_client::run_client;
use helpmate_shared::logger::setup_logger;
use helpmate_shared::room::RoomId;

#[derive(Parser, Debug)]
#[command(name = "helpmate-client")]
#[command(about = "CLI client for the Helpmate assignment chat", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:3000/ws")]
    url: String,

    /// Signed chat token for this user
    #[arg(short = 't', long)]
    token: String,

    /// Assignment id of the room to join on startup
    #[arg(short = 'a', long)]
    assignment_id: Option<i64>,

    /// Task id to open a mock room for when no assignment is confirmed yet
    #[arg(long)]
    task_id: Option<i64>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // A confirmed assignment wins over the optimistic mock room
    let initial_room = match (args.assignment_id, args.task_id) {
        (None, None) => None,
        (assignment_id, Some(task_id)) => Some(reconcile_room_id(assignment_id, task_id)),
        (Some(assignment_id), None) => Some(RoomId::Durable(assignment_id)),
    };

    // Run the client
    if let Err(e) = run_client(args.url, args.token, initial_room).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

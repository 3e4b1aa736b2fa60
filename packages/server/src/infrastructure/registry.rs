//! Process-local room membership registry.
//!
//! Maps each room to the set of connections currently joined to it. Rooms
//! are ephemeral: nothing here is persisted, and the registry restarts
//! empty. The registry holds only connection ids, never the connections
//! themselves; teardown belongs to the WebSocket handler that owns the
//! socket.
//!
//! The registry is an injected, explicitly-owned instance (`Arc`), not a
//! module-level singleton, so tests can run several independent routers in
//! one process.

use std::collections::{HashMap, HashSet};

use helpmate_shared::room::RoomId;
use tokio::sync::Mutex;

use crate::domain::ConnectionId;

/// Membership sets for all live rooms.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomId, HashSet<ConnectionId>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Register a connection in a room, creating the membership set on
    /// first join. Joining twice is a no-op.
    pub async fn join(&self, room: RoomId, connection: ConnectionId) {
        let mut rooms = self.rooms.lock().await;
        rooms.entry(room).or_default().insert(connection);
    }

    /// Remove a connection from one room. Idempotent; empty rooms are
    /// dropped.
    pub async fn leave(&self, room: &RoomId, connection: ConnectionId) {
        let mut rooms = self.rooms.lock().await;
        if let Some(members) = rooms.get_mut(room) {
            members.remove(&connection);
            if members.is_empty() {
                rooms.remove(room);
            }
        }
    }

    /// Remove a connection from every room it had joined. Idempotent; this
    /// is the disconnect path and may be called more than once for the
    /// same connection.
    pub async fn leave_all(&self, connection: ConnectionId) {
        let mut rooms = self.rooms.lock().await;
        rooms.retain(|_, members| {
            members.remove(&connection);
            !members.is_empty()
        });
    }

    /// Snapshot of a room's current members. Callers must re-read this
    /// after every await point before broadcasting; membership may change
    /// while a persistence call is in flight.
    pub async fn members(&self, room: &RoomId) -> Vec<ConnectionId> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether a connection is currently joined to a room.
    pub async fn is_member(&self, room: &RoomId, connection: ConnectionId) -> bool {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room)
            .is_some_and(|members| members.contains(&connection))
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

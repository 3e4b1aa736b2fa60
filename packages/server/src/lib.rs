//! Helpmate chat server library.
//!
//! An authenticated, room-scoped message relay for the Helpmate task
//! marketplace. Requesters and helpers chat in one room per assignment;
//! messages for confirmed assignments are persisted, while optimistic
//! client-side "mock" rooms are relayed without ever touching storage.

// layers
pub mod auth;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

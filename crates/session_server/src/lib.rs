//! # Chess Session Server
//!
//! A server-authoritative two-player chess session over WebSockets. The
//! server holds one canonical game, seats the first two connections as white
//! and black (everyone else spectates), validates every submitted move
//! against the rules engine, and broadcasts accepted moves plus the full
//! position snapshot to every connected party.
//!
//! ## Architecture Overview
//!
//! * **Connection Manager** - WebSocket lifecycle, unicast and broadcast
//!   delivery of server events
//! * **Session Registry** - first-come seat assignment and release
//! * **Move Gate** - role/turn authorization, checked before the rules engine
//! * **Game Coordinator** - the single writer of the canonical position;
//!   orchestrates gate, rules validation, and event emission
//!
//! ## Message Flow
//!
//! 1. Client connects; the registry assigns a seat (or spectator) and the
//!    connection is told its role
//! 2. Client sends a `move` event with `{from, to, promotion?}`
//! 3. The coordinator gates the submission by seat and side to move;
//!    unauthorized submissions are dropped without feedback
//! 4. The rules engine validates and applies the move
//! 5. On success, every connection receives the applied `move` and a
//!    `boardState` snapshot; on rejection, only the sender receives
//!    `invalidMove` with the original payload
//!
//! ## Concurrency
//!
//! Session state lives behind a single async mutex owned by the
//! coordinator, so every submission is processed to completion before the
//! next one is considered. Two near-simultaneous submissions are fully
//! serialized: the second sees the position already advanced (or left
//! untouched) by the first.

// Re-export core types and functions for easy access
pub use config::ServerConfig;
pub use connection::ConnectionManager;
pub use error::ServerError;
pub use game::{GameCoordinator, SessionRegistry};
pub use server::{ChessServer, ShutdownState};
pub use utils::{create_server, create_server_with_config};

// Public module declarations
pub mod config;
pub mod connection;
pub mod error;
pub mod game;
pub mod server;
pub mod utils;

// Internal modules (not part of public API)
mod messaging;
mod tests;

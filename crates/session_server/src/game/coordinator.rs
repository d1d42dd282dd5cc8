//! Orchestration of the single game session.
//!
//! The coordinator owns the canonical session state (seat registry plus
//! rules engine) and is its only writer. Every connection event — seat
//! assignment, move submission, disconnect — takes the session mutex and is
//! handled to completion before the next one is considered, so concurrent
//! submissions are fully serialized.

use super::{gate, registry::SeatAssignment, registry::SessionRegistry};
use crate::connection::{ConnectionId, ConnectionManager};
use chess_rules::RulesEngine;
use session_protocol::{MoveRequest, SeatColor, ServerEvent};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Canonical per-session state. Mutated only under the coordinator's mutex.
#[derive(Debug)]
struct SessionState {
    registry: SessionRegistry,
    rules: RulesEngine,
}

/// Coordinates the game session: receives candidate moves, consults the
/// move gate and then the rules engine, updates canonical state, and
/// decides what gets broadcast versus unicast.
///
/// Emission happens while the session lock is held, so the broadcast order
/// observed by clients always matches the order moves were applied.
#[derive(Debug)]
pub struct GameCoordinator {
    state: Mutex<SessionState>,
    connections: Arc<ConnectionManager>,
}

impl GameCoordinator {
    /// Creates a coordinator for a fresh game at the starting position.
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self {
            state: Mutex::new(SessionState {
                registry: SessionRegistry::new(),
                rules: RulesEngine::new(),
            }),
            connections,
        }
    }

    /// Assigns a role to a newly established connection and notifies it.
    ///
    /// The first connection without a seat gets white, the second black,
    /// everyone else spectates. The connection is told its assignment with
    /// a dedicated event: `playerRole` for a seat, `spectatorRole`
    /// otherwise.
    pub async fn register_connection(&self, connection_id: ConnectionId) {
        let mut state = self.state.lock().await;
        match state.registry.assign(connection_id) {
            SeatAssignment::Seat(color) => {
                info!("♟️ Connection {} seated as {}", connection_id, color);
                self.connections
                    .send_event(connection_id, &ServerEvent::PlayerRole(color))
                    .await;
            }
            SeatAssignment::Spectator => {
                info!("👁️ Connection {} joins as spectator", connection_id);
                self.connections
                    .send_event(connection_id, &ServerEvent::SpectatorRole)
                    .await;
            }
        }
    }

    /// Releases whatever seat the connection held.
    ///
    /// The freed seat becomes available to the next new connection.
    /// Remaining participants are not informed that a seat emptied.
    pub async fn release_connection(&self, connection_id: ConnectionId) {
        let mut state = self.state.lock().await;
        state.registry.release(connection_id);
    }

    /// Processes a single move submission.
    ///
    /// Submissions from connections that are not the side to move are
    /// dropped without any client feedback. Submissions that fail rules
    /// validation (including malformed coordinates or promotion letters)
    /// yield exactly one `invalidMove` to the sender, echoing the original
    /// payload, and leave the canonical position untouched. Accepted moves
    /// are broadcast to every connection — the mover included — as the raw
    /// move followed by the full position snapshot.
    pub async fn submit_move(&self, connection_id: ConnectionId, request: MoveRequest) {
        let mut state = self.state.lock().await;

        if !gate::authorize(&state.registry, connection_id, state.rules.side_to_move()) {
            debug!(
                "Dropping move {}{} from connection {}: not the side to move",
                request.from, request.to, connection_id
            );
            return;
        }

        match state.rules.try_apply(&request) {
            Ok(()) => {
                let snapshot = state.rules.fen();
                self.connections
                    .broadcast_event(&ServerEvent::Move(request))
                    .await;
                self.connections
                    .broadcast_event(&ServerEvent::BoardState(snapshot.clone()))
                    .await;
                if state.rules.is_game_over() {
                    info!("🏁 Game over: {}", snapshot);
                }
            }
            Err(e) => {
                info!("Invalid move from connection {}: {}", connection_id, e);
                self.connections
                    .send_event(connection_id, &ServerEvent::InvalidMove(request))
                    .await;
            }
        }
    }

    /// The current canonical position snapshot.
    pub async fn snapshot(&self) -> String {
        self.state.lock().await.rules.fen()
    }

    /// The seat whose turn it is in the canonical position.
    pub async fn side_to_move(&self) -> SeatColor {
        self.state.lock().await.rules.side_to_move()
    }
}

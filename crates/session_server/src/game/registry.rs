//! Seat assignment for the single process-wide game session.

use crate::connection::ConnectionId;
use session_protocol::SeatColor;

/// The outcome of assigning a role to a new connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatAssignment {
    /// The connection was bound to a seat
    Seat(SeatColor),

    /// Both seats were taken; the connection spectates
    Spectator,
}

/// Tracks which connection holds which seat in the session.
///
/// Assignment is deterministic first-come: the first unassigned connection
/// becomes white, the second becomes black, and every subsequent connection
/// becomes a spectator. Releasing a seat makes it available to the *next
/// new* connection; existing spectators are never retroactively promoted.
///
/// At most one connection holds white and at most one holds black at any
/// time. Connections holding no seat never appear here at all.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    white: Option<ConnectionId>,
    black: Option<ConnectionId>,
}

impl SessionRegistry {
    /// Creates a registry with both seats unassigned.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a role to a connecting participant.
    ///
    /// This operation cannot fail; a connection that gets no seat is a
    /// spectator.
    pub fn assign(&mut self, connection_id: ConnectionId) -> SeatAssignment {
        if self.white.is_none() {
            self.white = Some(connection_id);
            SeatAssignment::Seat(SeatColor::White)
        } else if self.black.is_none() {
            self.black = Some(connection_id);
            SeatAssignment::Seat(SeatColor::Black)
        } else {
            SeatAssignment::Spectator
        }
    }

    /// Releases whatever seat the connection holds, if any.
    ///
    /// Spectator connections hold nothing, so releasing them is a no-op.
    pub fn release(&mut self, connection_id: ConnectionId) {
        if self.white == Some(connection_id) {
            self.white = None;
        } else if self.black == Some(connection_id) {
            self.black = None;
        }
    }

    /// The seat bound to a connection, or `None` for spectators and
    /// unrecognized connections.
    pub fn seat_of(&self, connection_id: ConnectionId) -> Option<SeatColor> {
        if self.white == Some(connection_id) {
            Some(SeatColor::White)
        } else if self.black == Some(connection_id) {
            Some(SeatColor::Black)
        } else {
            None
        }
    }
}

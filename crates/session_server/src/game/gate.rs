//! Move authorization: who may submit a move right now.

use super::registry::SessionRegistry;
use crate::connection::ConnectionId;
use session_protocol::SeatColor;

/// Returns true iff the seat bound to `connection_id` is the side to move.
///
/// Spectators and unrecognized connections are always unauthorized. This is
/// purely a role/turn check; move legality is the rules engine's job and is
/// only consulted after this gate passes.
pub fn authorize(
    registry: &SessionRegistry,
    connection_id: ConnectionId,
    side_to_move: SeatColor,
) -> bool {
    registry.seat_of(connection_id) == Some(side_to_move)
}

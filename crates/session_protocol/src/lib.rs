//! Wire protocol types for the chess session server.
//!
//! Every frame on the WebSocket channel is a single JSON object with an
//! `event` tag and an optional `data` payload. Both directions share the
//! move request shape so the server can echo a rejected payload back to the
//! sender unchanged.

use serde::{Deserialize, Serialize};

/// The seat a connection holds in the session.
///
/// Serialized as the single-letter tags `"w"` and `"b"` used on the wire
/// and in FEN side-to-move fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatColor {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl SeatColor {
    /// The opposing seat.
    pub fn other(self) -> Self {
        match self {
            SeatColor::White => SeatColor::Black,
            SeatColor::Black => SeatColor::White,
        }
    }
}

impl std::fmt::Display for SeatColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeatColor::White => write!(f, "w"),
            SeatColor::Black => write!(f, "b"),
        }
    }
}

/// A move attempt as submitted by a client.
///
/// `from` and `to` are algebraic square coordinates (`"e2"`, `"e4"`);
/// `promotion` is an optional lowercase piece letter (`"q"`, `"r"`, `"b"`,
/// `"n"`). The request is transient: it is either applied and broadcast
/// verbatim, or echoed back verbatim in an `invalidMove` event.
///
/// # Examples
///
/// ```json
/// { "from": "e2", "to": "e4", "promotion": "q" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Origin square in algebraic notation
    pub from: String,

    /// Destination square in algebraic notation
    pub to: String,

    /// Requested promotion piece, ignored unless the move actually promotes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

/// A message sent from a client to the server.
///
/// # Examples
///
/// ```json
/// { "event": "move", "data": { "from": "e2", "to": "e4" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// A move attempt for the current position
    #[serde(rename = "move")]
    Move(MoveRequest),
}

/// A message sent from the server to one or all clients.
///
/// `playerRole` and `spectatorRole` are unicast exactly once per
/// connection; `move` and `boardState` are broadcast to every connection
/// after a move is accepted; `invalidMove` is unicast to the originating
/// connection only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Seat assignment, sent once on connection when a seat is free
    #[serde(rename = "playerRole")]
    PlayerRole(SeatColor),

    /// Spectator assignment, sent once on connection when both seats are taken
    #[serde(rename = "spectatorRole")]
    SpectatorRole,

    /// An accepted move, broadcast to all connections unchanged
    #[serde(rename = "move")]
    Move(MoveRequest),

    /// Full canonical position snapshot (FEN), broadcast to all connections
    #[serde(rename = "boardState")]
    BoardState(String),

    /// A rejected move payload, echoed back to the sender unchanged
    #[serde(rename = "invalidMove")]
    InvalidMove(MoveRequest),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_events_use_source_wire_shapes() {
        let role = serde_json::to_value(ServerEvent::PlayerRole(SeatColor::White)).unwrap();
        assert_eq!(role, json!({ "event": "playerRole", "data": "w" }));

        let spectator = serde_json::to_value(ServerEvent::SpectatorRole).unwrap();
        assert_eq!(spectator, json!({ "event": "spectatorRole" }));

        let board = serde_json::to_value(ServerEvent::BoardState("8/8/8/8/8/8/8/8 w - - 0 1".into()))
            .unwrap();
        assert_eq!(
            board,
            json!({ "event": "boardState", "data": "8/8/8/8/8/8/8/8 w - - 0 1" })
        );
    }

    #[test]
    fn move_request_omits_absent_promotion() {
        let mv = MoveRequest {
            from: "e2".into(),
            to: "e4".into(),
            promotion: None,
        };
        let value = serde_json::to_value(ServerEvent::Move(mv)).unwrap();
        assert_eq!(
            value,
            json!({ "event": "move", "data": { "from": "e2", "to": "e4" } })
        );
    }

    #[test]
    fn invalid_move_echoes_payload_unchanged() {
        let original = MoveRequest {
            from: "e7".into(),
            to: "e8".into(),
            promotion: Some("q".into()),
        };
        let echoed = ServerEvent::InvalidMove(original.clone());
        let text = serde_json::to_string(&echoed).unwrap();
        let back: ServerEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(back, ServerEvent::InvalidMove(original));
    }

    #[test]
    fn client_move_parses_with_and_without_promotion() {
        let plain: ClientEvent =
            serde_json::from_str(r#"{"event":"move","data":{"from":"e2","to":"e4"}}"#).unwrap();
        let ClientEvent::Move(mv) = plain;
        assert_eq!(mv.from, "e2");
        assert_eq!(mv.promotion, None);

        let promoting: ClientEvent = serde_json::from_str(
            r#"{"event":"move","data":{"from":"e7","to":"e8","promotion":"q"}}"#,
        )
        .unwrap();
        let ClientEvent::Move(mv) = promoting;
        assert_eq!(mv.promotion.as_deref(), Some("q"));
    }

    #[test]
    fn unknown_client_events_are_rejected() {
        let result = serde_json::from_str::<ClientEvent>(r#"{"event":"chat","data":"hi"}"#);
        assert!(result.is_err());
    }
}

//! Local mirror of the canonical position, with capture inference.
//!
//! The projection is updated along two paths, mirroring the two server
//! broadcasts: `apply_move` replays an accepted move locally and records
//! the occupant of the target square as captured; `apply_snapshot`
//! reconciles against the authoritative position by diffing squares that
//! held a piece before and are empty now, then overwriting the local
//! position wholesale. Applying the same snapshot twice diffs to nothing,
//! so duplicate delivery never double-counts captures.

use chess_rules::{RulesEngine, RulesError};
use session_protocol::{MoveRequest, SeatColor};
use shakmaty::{Piece, Square};

/// A client's locally reconstructed mirror of the canonical position plus
/// the accumulated list of captured pieces.
///
/// The captured list is not authoritative; it exists purely for display and
/// is rebuilt by the renderer from this list on every update.
#[derive(Debug)]
pub struct BoardProjection {
    rules: RulesEngine,
    captured: Vec<Piece>,
}

impl BoardProjection {
    /// Creates a projection at the starting position with no captures.
    pub fn new() -> Self {
        Self {
            rules: RulesEngine::new(),
            captured: Vec::new(),
        }
    }

    /// The pieces inferred as captured so far, in discovery order.
    pub fn captured(&self) -> &[Piece] {
        &self.captured
    }

    /// The seat to move in the projected position.
    pub fn side_to_move(&self) -> SeatColor {
        self.rules.side_to_move()
    }

    /// The piece on `square` in the projected position, if any.
    pub fn piece_on(&self, square: Square) -> Option<Piece> {
        self.rules.piece_on(square)
    }

    /// The projected position as FEN.
    pub fn fen(&self) -> String {
        self.rules.fen()
    }

    /// Replays a broadcast move against the local position.
    ///
    /// If the move lands on an occupied square, that occupant is recorded
    /// as captured once the move applies.
    pub fn apply_move(&mut self, request: &MoveRequest) -> Result<(), RulesError> {
        let occupant = request
            .to
            .parse::<Square>()
            .ok()
            .and_then(|square| self.rules.piece_on(square));

        self.rules.try_apply(request)?;

        if let Some(piece) = occupant {
            self.captured.push(piece);
        }
        Ok(())
    }

    /// Reconciles the local position against an authoritative snapshot.
    ///
    /// Every square that held a piece locally and is empty in the snapshot
    /// contributes that vanished piece to the captured list; the local
    /// position is then unconditionally overwritten with the snapshot.
    pub fn apply_snapshot(&mut self, fen: &str) -> Result<(), RulesError> {
        let next = RulesEngine::from_fen(fen)?;

        for index in 0..64u32 {
            let square = Square::new(index);
            if next.piece_on(square).is_none() {
                if let Some(piece) = self.rules.piece_on(square) {
                    self.captured.push(piece);
                }
            }
        }

        self.rules = next;
        Ok(())
    }
}

impl Default for BoardProjection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{Color, Role};

    fn mv(from: &str, to: &str) -> MoveRequest {
        MoveRequest {
            from: from.into(),
            to: to.into(),
            promotion: None,
        }
    }

    /// Plays the scandinavian capture sequence on a server-side engine and
    /// returns the resulting snapshot.
    fn fen_after_capture() -> String {
        let mut rules = RulesEngine::new();
        rules.try_apply(&mv("e2", "e4")).unwrap();
        rules.try_apply(&mv("d7", "d5")).unwrap();
        rules.try_apply(&mv("e4", "d5")).unwrap();
        rules.fen()
    }

    #[test]
    fn replayed_moves_record_the_captured_occupant() {
        let mut projection = BoardProjection::new();
        projection.apply_move(&mv("e2", "e4")).unwrap();
        projection.apply_move(&mv("d7", "d5")).unwrap();
        projection.apply_move(&mv("e4", "d5")).unwrap();

        assert_eq!(
            projection.captured(),
            &[Piece {
                color: Color::Black,
                role: Role::Pawn,
            }]
        );
    }

    #[test]
    fn snapshot_after_a_replayed_move_adds_nothing() {
        // The common path: the client applies the broadcast move, then the
        // matching snapshot arrives. The diff is empty.
        let mut projection = BoardProjection::new();
        projection.apply_move(&mv("e2", "e4")).unwrap();
        let fen = projection.fen();

        projection.apply_snapshot(&fen).unwrap();
        assert!(projection.captured().is_empty());
    }

    #[test]
    fn duplicate_snapshot_application_is_idempotent() {
        let fen = fen_after_capture();

        let mut projection = BoardProjection::new();
        projection.apply_snapshot(&fen).unwrap();
        let after_first = projection.captured().to_vec();

        projection.apply_snapshot(&fen).unwrap();
        assert_eq!(projection.captured(), after_first.as_slice());
    }

    #[test]
    fn snapshot_overwrites_the_local_position() {
        let fen = fen_after_capture();

        let mut projection = BoardProjection::new();
        projection.apply_snapshot(&fen).unwrap();

        assert_eq!(projection.fen(), fen);
        assert_eq!(projection.side_to_move(), SeatColor::Black);
    }

    #[test]
    fn rejected_moves_change_nothing() {
        let mut projection = BoardProjection::new();
        let before = projection.fen();

        assert!(projection.apply_move(&mv("e2", "e5")).is_err());
        assert_eq!(projection.fen(), before);
        assert!(projection.captured().is_empty());
    }

    #[test]
    fn garbage_snapshot_leaves_the_projection_untouched() {
        let mut projection = BoardProjection::new();
        projection.apply_move(&mv("e2", "e4")).unwrap();
        let before = projection.fen();

        assert!(projection.apply_snapshot("definitely not fen").is_err());
        assert_eq!(projection.fen(), before);
    }
}

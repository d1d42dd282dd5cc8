//! Rules-engine seam for the chess session server.
//!
//! The session core treats move legality as an external concern: it hands a
//! candidate [`MoveRequest`] to the [`RulesEngine`] and gets back either the
//! mutated canonical position or a [`RulesError`]. Everything chess-specific
//! (legal-move generation, check detection, FEN encoding) stays behind this
//! seam, provided by the `shakmaty` crate.

use session_protocol::{MoveRequest, SeatColor};
use shakmaty::{
    fen::Fen, uci::UciMove, CastlingMode, Chess, Color, EnPassantMode, Piece, Position, Rank,
    Role, Square,
};

/// Errors produced while validating or applying a candidate move.
///
/// The server surfaces all of these identically (an `invalidMove` echo to
/// the sender); the variants exist so logs and tests can tell a garbled
/// payload from a rules-illegal move.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// A square coordinate that is not a valid algebraic square
    #[error("malformed square coordinate: {0}")]
    MalformedSquare(String),

    /// A promotion field that is not a single piece letter
    #[error("malformed promotion piece: {0}")]
    MalformedPromotion(String),

    /// A well-formed move that is not legal in the current position
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// A position snapshot that is not valid FEN
    #[error("malformed position snapshot: {0}")]
    MalformedSnapshot(String),
}

/// Authoritative chess position with validate-and-apply semantics.
///
/// Owns a `shakmaty` position and exposes the narrow surface the session
/// core needs: side to move, a serializable snapshot, and a single
/// [`try_apply`](RulesEngine::try_apply) operation that either advances the
/// position or leaves it untouched.
#[derive(Debug, Clone)]
pub struct RulesEngine {
    position: Chess,
}

impl RulesEngine {
    /// Creates an engine holding the standard starting position.
    pub fn new() -> Self {
        Self {
            position: Chess::default(),
        }
    }

    /// Creates an engine from a FEN snapshot.
    ///
    /// Used by clients reconciling against a broadcast `boardState`, and by
    /// tests that need a mid-game position.
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let position = fen
            .parse::<Fen>()
            .map_err(|e| RulesError::MalformedSnapshot(e.to_string()))?
            .into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::MalformedSnapshot(e.to_string()))?;
        Ok(Self { position })
    }

    /// The seat whose turn it is in the current position.
    pub fn side_to_move(&self) -> SeatColor {
        match self.position.turn() {
            Color::White => SeatColor::White,
            Color::Black => SeatColor::Black,
        }
    }

    /// The canonical FEN snapshot of the current position.
    pub fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    /// The piece standing on `square`, if any.
    pub fn piece_on(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    /// Whether the game has ended (checkmate, stalemate, or dead position).
    pub fn is_game_over(&self) -> bool {
        self.position.is_game_over()
    }

    /// Validates `request` against the current position and applies it.
    ///
    /// On success the canonical position advances to the resulting position.
    /// On any error the position is left exactly as it was.
    ///
    /// The `promotion` field is honored only when the move actually promotes
    /// (a pawn moving to the back rank); clients routinely attach a default
    /// `"q"` to every move and the field is ignored for ordinary moves.
    pub fn try_apply(&mut self, request: &MoveRequest) -> Result<(), RulesError> {
        let from: Square = request
            .from
            .parse()
            .map_err(|_| RulesError::MalformedSquare(request.from.clone()))?;
        let to: Square = request
            .to
            .parse()
            .map_err(|_| RulesError::MalformedSquare(request.to.clone()))?;

        let promotion = match request.promotion.as_deref() {
            Some(piece) if self.promotes(from, to) => Some(parse_promotion(piece)?),
            _ => None,
        };

        let uci = UciMove::Normal {
            from,
            to,
            promotion,
        };
        let candidate = uci
            .to_move(&self.position)
            .map_err(|_| RulesError::IllegalMove(uci.to_string()))?;
        self.position = self
            .position
            .clone()
            .play(&candidate)
            .map_err(|_| RulesError::IllegalMove(uci.to_string()))?;
        Ok(())
    }

    /// A move from `from` to `to` would promote: pawn moving to a back rank.
    fn promotes(&self, from: Square, to: Square) -> bool {
        self.position.board().role_at(from) == Some(Role::Pawn)
            && matches!(to.rank(), Rank::First | Rank::Eighth)
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_promotion(piece: &str) -> Result<Role, RulesError> {
    let mut chars = piece.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            Role::from_char(c).ok_or_else(|| RulesError::MalformedPromotion(piece.to_string()))
        }
        _ => Err(RulesError::MalformedPromotion(piece.to_string())),
    }
}

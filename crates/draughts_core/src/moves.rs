use crate::{piece::Color, position::Square};
use thiserror::Error;

/// A single hop of a piece: one landing square. A full turn is a sequence
/// of hops by the same piece, chained while captures remain available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub is_capture: bool,
}

impl Move {
    pub fn step(from: Square, to: Square) -> Self {
        Self { from, to, is_capture: false }
    }

    pub fn capture(from: Square, to: Square) -> Self {
        Self { from, to, is_capture: true }
    }

    /// Draughts notation for this hop: "32-28" for a quiet move,
    /// "37x28" for a capture.
    pub fn notation(&self) -> String {
        let from = self.from.number().map_or_else(|| "?".into(), |n| n.to_string());
        let to = self.to.number().map_or_else(|| "?".into(), |n| n.to_string());
        let sep = if self.is_capture { 'x' } else { '-' };
        format!("{from}{sep}{to}")
    }
}

/// One legal landing choice for a piece, with the total number of pieces
/// the turn will capture if this hop is taken (0 for a quiet move).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOption {
    pub to: Square,
    pub is_capture: bool,
    pub chain_value: u32,
}

/// What happened after one hop was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The hop captured a piece and the same piece has a mandatory
    /// continuation from `square`; the turn is not over.
    ChainContinues { square: Square },
    /// Pending captures were removed, promotion applied, side flipped.
    TurnComplete,
    /// The side now to move has no legal moves and loses.
    GameOver { winner: Color },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("no piece at {at:?}")]
    NoPiece { at: Square },
    #[error("piece does not belong to the side to move")]
    NotYourTurn,
    #[error("a capture chain is in progress; the piece at {square:?} must move")]
    MustContinueChain { square: Square },
    #[error("illegal move from {from:?} to {to:?}")]
    Illegal { from: Square, to: Square },
}

use std::collections::HashMap;
use std::fmt;

use crate::{
    moves::{Move, MoveError, MoveOutcome},
    piece::{Color, Piece, Rank},
    position::{Square, BOARD_SIZE},
    rules,
};

/// The 10x10 board together with the side to move and the state of an
/// in-progress capture chain.
///
/// Pieces jumped during the current turn stay in the map ("pending
/// captures") and are only removed when the chain ends; while a chain is
/// running, `chain_square` locks the turn to the moving piece.
#[derive(Debug, Clone)]
pub struct Board {
    pieces: HashMap<Square, Piece>,
    current_turn: Color,
    pending_captures: Vec<Square>,
    chain_square: Option<Square>,
}

impl Board {
    /// Standard starting position: rows 0-3 Black men, rows 6-9 White men,
    /// dark squares only. White moves first.
    pub fn new() -> Self {
        let mut board = Self::empty(Color::White);
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let sq = Square { row, col };
                if !sq.is_dark() {
                    continue;
                }
                if row < 4 {
                    board.pieces.insert(sq, Piece::man(Color::Black));
                } else if row >= 6 {
                    board.pieces.insert(sq, Piece::man(Color::White));
                }
            }
        }
        board
    }

    pub fn empty(current_turn: Color) -> Self {
        Self {
            pieces: HashMap::new(),
            current_turn,
            pending_captures: Vec::new(),
            chain_square: None,
        }
    }

    /// Builds an arbitrary position. Pieces on light or repeated squares
    /// are ignored; intended for tests and analysis setups.
    pub fn from_pieces(current_turn: Color, pieces: &[(Square, Piece)]) -> Self {
        let mut board = Self::empty(current_turn);
        for &(sq, piece) in pieces {
            if sq.is_dark() {
                board.pieces.insert(sq, piece);
            }
        }
        board
    }

    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.pieces.get(&sq)
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Square, &Piece)> + '_ {
        self.pieces.iter().map(|(sq, piece)| (*sq, piece))
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn current_turn(&self) -> Color {
        self.current_turn
    }

    /// Squares jumped so far in the current, still-running turn.
    pub fn pending_captures(&self) -> &[Square] {
        &self.pending_captures
    }

    /// The square of the piece locked into an unfinished capture chain.
    pub fn chain_square(&self) -> Option<Square> {
        self.chain_square
    }

    /// True when every square strictly between `from` and `to` on a shared
    /// diagonal is empty. False when the squares are not on a diagonal.
    pub fn is_diagonal_path_clear(&self, from: Square, to: Square) -> bool {
        let dr = to.row as i8 - from.row as i8;
        let dc = to.col as i8 - from.col as i8;
        if dr.abs() != dc.abs() || dr == 0 {
            return false;
        }
        let step = (dr.signum(), dc.signum());
        let mut cursor = from.offset(step.0, step.1);
        while let Some(sq) = cursor {
            if sq == to {
                return true;
            }
            if self.pieces.contains_key(&sq) {
                return false;
            }
            cursor = sq.offset(step.0, step.1);
        }
        false
    }

    /// Applies one hop, following the turn resolution protocol.
    ///
    /// If the hop captures and the same piece still has a legal capturing
    /// continuation, the turn is not over: the captured square joins the
    /// pending set and `ChainContinues` is returned. Otherwise pending
    /// pieces are removed, promotion is applied, and the side flips.
    /// A Man landing on the promotion row promotes and ends the chain even
    /// if the new King would have further captures.
    ///
    /// Illegal hops are rejected without touching the board.
    pub fn apply_move(&mut self, mv: Move) -> Result<MoveOutcome, MoveError> {
        let piece = *self.pieces.get(&mv.from).ok_or(MoveError::NoPiece { at: mv.from })?;
        if piece.color != self.current_turn {
            return Err(MoveError::NotYourTurn);
        }
        if let Some(locked) = self.chain_square {
            if mv.from != locked {
                return Err(MoveError::MustContinueChain { square: locked });
            }
        }

        let options = rules::legal_moves(self, mv.from, self.current_turn, &self.pending_captures);
        let option = options
            .iter()
            .find(|option| option.to == mv.to)
            .copied()
            .ok_or(MoveError::Illegal { from: mv.from, to: mv.to })?;

        self.pieces.remove(&mv.from);
        self.pieces.insert(mv.to, piece);

        if option.is_capture {
            // Legality guarantees exactly one victim between the squares.
            if let Some(victim) = rules::find_captured_piece(self, mv.from, mv.to) {
                self.pending_captures.push(victim);
            }

            let promotes_now =
                piece.rank == Rank::Man && mv.to.row == piece.color.promotion_row();
            if !promotes_now {
                let continuations =
                    rules::legal_moves(self, mv.to, self.current_turn, &self.pending_captures);
                if continuations.iter().any(|option| option.is_capture) {
                    self.chain_square = Some(mv.to);
                    return Ok(MoveOutcome::ChainContinues { square: mv.to });
                }
            }
        }

        Ok(self.finish_turn(mv.to, piece))
    }

    fn finish_turn(&mut self, landing: Square, piece: Piece) -> MoveOutcome {
        for sq in self.pending_captures.drain(..) {
            self.pieces.remove(&sq);
        }
        self.chain_square = None;

        if piece.rank == Rank::Man && landing.row == piece.color.promotion_row() {
            self.pieces.insert(landing, piece.promoted());
        }

        self.current_turn = self.current_turn.opponent();

        if let Some(winner) = rules::check_winner(self, self.current_turn) {
            log::debug!("game over, winner: {winner:?}");
            return MoveOutcome::GameOver { winner };
        }
        MoveOutcome::TurnComplete
    }

    /// Winner of the position, if the side to move has already lost.
    pub fn winner(&self) -> Option<Color> {
        rules::check_winner(self, self.current_turn)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let sq = Square { row, col };
                let c = match self.pieces.get(&sq) {
                    Some(piece) => piece.as_char(),
                    None if sq.is_dark() => '.',
                    None => ' ',
                };
                write!(f, "{c} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

//! Legal-move and legal-capture enumeration for international draughts.
//!
//! Captures are mandatory, chain while available, and are subject to the
//! majority rule: only pieces able to reach the board-wide longest chain
//! may move, and every hop must stay on some longest chain. Pieces jumped
//! earlier in the current turn stay on the board ("pending captures")
//! until the turn ends and can be neither re-captured nor passed through.

use crate::{
    moves::MoveOption,
    piece::{Color, Piece, Rank},
    position::Square,
};

const DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Landing squares reachable by one capturing hop from `square`.
///
/// A Man jumps an adjacent un-jumped opponent onto the empty square right
/// behind it. A King scans each diagonal: the first occupied square must
/// hold an un-jumped opponent, and every empty square beyond it up to the
/// next obstruction is a landing choice. A second piece in the ray, jumped
/// or not, blocks the whole ray.
pub fn possible_captures(
    board: &crate::Board,
    square: Square,
    piece: Piece,
    pending: &[Square],
) -> Vec<Square> {
    let mut captures = Vec::new();

    for (dr, dc) in DIRECTIONS {
        match piece.rank {
            Rank::Man => {
                let Some(over) = square.offset(dr, dc) else { continue };
                let Some(landing) = square.offset(2 * dr, 2 * dc) else { continue };
                if pending.contains(&over) {
                    continue;
                }
                let jumpable = board
                    .piece_at(over)
                    .map_or(false, |target| target.is_opponent_of(&piece));
                if jumpable && board.piece_at(landing).is_none() {
                    captures.push(landing);
                }
            }
            Rank::King => {
                // Slide to the first occupied square on this ray.
                let mut cursor = square.offset(dr, dc);
                while let Some(sq) = cursor {
                    match board.piece_at(sq) {
                        None => cursor = sq.offset(dr, dc),
                        Some(target) => {
                            if target.is_opponent_of(&piece) && !pending.contains(&sq) {
                                // Every empty square behind the victim is a
                                // landing, up to the next obstruction.
                                let mut landing = sq.offset(dr, dc);
                                while let Some(land) = landing {
                                    if board.piece_at(land).is_some() {
                                        break;
                                    }
                                    captures.push(land);
                                    landing = land.offset(dr, dc);
                                }
                            }
                            break;
                        }
                    }
                }
            }
        }
    }

    captures
}

/// Length of the longest capture chain reachable from this square/state.
///
/// A Man's chain ends on the promotion row (promotion is terminal within
/// a turn), so landings there contribute no further depth.
pub fn max_capture_depth(
    board: &crate::Board,
    square: Square,
    piece: Piece,
    pending: &[Square],
) -> u32 {
    if piece.rank == Rank::Man && square.row == piece.color.promotion_row() {
        return 0;
    }
    let mut best = 0;
    for landing in possible_captures(board, square, piece, pending) {
        // find_captured_piece cannot fail for a landing we just generated.
        let Some(victim) = find_captured_piece(board, square, landing) else { continue };
        let mut deeper_pending = pending.to_vec();
        deeper_pending.push(victim);
        let depth = 1 + max_capture_depth(board, landing, piece, &deeper_pending);
        best = best.max(depth);
    }
    best
}

/// All legal landing choices for the piece on `square`, honoring the
/// forced-capture majority rule.
///
/// At the start of a turn (`pending` empty) a piece may move only if its
/// longest chain matches the board-wide maximum; with captures available
/// anywhere, quiet moves are illegal for every piece. Mid-chain (`pending`
/// non-empty) only capturing continuations on the piece's own longest
/// remaining chain are returned.
pub fn legal_moves(
    board: &crate::Board,
    square: Square,
    player: Color,
    pending: &[Square],
) -> Vec<MoveOption> {
    let global_max = if pending.is_empty() {
        longest_chain_for_player(board, player)
    } else {
        // The board-wide maximum was settled at turn start; mid-chain the
        // moving piece only has to follow its own longest continuation.
        u32::MAX
    };
    legal_moves_with_global(board, square, player, pending, global_max)
}

/// The longest capture chain any piece of `player` can start this turn.
pub fn longest_chain_for_player(board: &crate::Board, player: Color) -> u32 {
    board
        .pieces()
        .filter(|(_, piece)| piece.color == player)
        .map(|(sq, piece)| max_capture_depth(board, sq, *piece, &[]))
        .max()
        .unwrap_or(0)
}

fn legal_moves_with_global(
    board: &crate::Board,
    square: Square,
    player: Color,
    pending: &[Square],
    global_max: u32,
) -> Vec<MoveOption> {
    let Some(&piece) = board.piece_at(square) else { return Vec::new() };
    if piece.color != player {
        return Vec::new();
    }

    if pending.is_empty() && global_max == 0 {
        return quiet_moves(board, square, piece);
    }

    let own_max = max_capture_depth(board, square, piece, pending);
    if own_max == 0 || (pending.is_empty() && own_max < global_max) {
        return Vec::new();
    }

    // Only hops that lie on some longest chain are legal.
    let mut options = Vec::new();
    for landing in possible_captures(board, square, piece, pending) {
        let Some(victim) = find_captured_piece(board, square, landing) else { continue };
        let mut deeper_pending = pending.to_vec();
        deeper_pending.push(victim);
        let chain_value = 1 + max_capture_depth(board, landing, piece, &deeper_pending);
        if chain_value == own_max {
            options.push(MoveOption { to: landing, is_capture: true, chain_value });
        }
    }
    options
}

fn quiet_moves(board: &crate::Board, square: Square, piece: Piece) -> Vec<MoveOption> {
    let mut options = Vec::new();
    match piece.rank {
        Rank::Man => {
            let dr = piece.color.forward();
            for dc in [-1, 1] {
                if let Some(to) = square.offset(dr, dc) {
                    if board.piece_at(to).is_none() {
                        options.push(MoveOption { to, is_capture: false, chain_value: 0 });
                    }
                }
            }
        }
        Rank::King => {
            for (dr, dc) in DIRECTIONS {
                let mut cursor = square.offset(dr, dc);
                while let Some(to) = cursor {
                    if board.piece_at(to).is_some() {
                        break;
                    }
                    options.push(MoveOption { to, is_capture: false, chain_value: 0 });
                    cursor = to.offset(dr, dc);
                }
            }
        }
    }
    options
}

/// Every legal `(from, option)` pair for `player`, flattened across all of
/// its pieces. Computes the board-wide chain maximum once.
pub fn all_legal_moves(board: &crate::Board, player: Color) -> Vec<(Square, MoveOption)> {
    let global_max = longest_chain_for_player(board, player);
    let mut squares: Vec<Square> = board
        .pieces()
        .filter(|(_, piece)| piece.color == player)
        .map(|(sq, _)| sq)
        .collect();
    // HashMap iteration order is arbitrary; keep the result deterministic.
    squares.sort();

    let mut moves = Vec::new();
    for sq in squares {
        for option in legal_moves_with_global(board, sq, player, &[], global_max) {
            moves.push((sq, option));
        }
    }
    moves
}

/// The single opponent square strictly between `from` and `to` on the
/// diagonal. Supports two-square Man jumps and long-range King jumps.
pub fn find_captured_piece(board: &crate::Board, from: Square, to: Square) -> Option<Square> {
    let dr = (to.row as i8 - from.row as i8).signum();
    let dc = (to.col as i8 - from.col as i8).signum();
    if (to.row as i8 - from.row as i8).abs() != (to.col as i8 - from.col as i8).abs() {
        return None;
    }

    let mut found = None;
    let mut cursor = from.offset(dr, dc);
    while let Some(sq) = cursor {
        if sq == to {
            return found;
        }
        if board.piece_at(sq).is_some() {
            if found.is_some() {
                return None; // two pieces between: not a single jump
            }
            found = Some(sq);
        }
        cursor = sq.offset(dr, dc);
    }
    None
}

/// A player with zero legal moves across all of its pieces loses.
pub fn can_player_move(board: &crate::Board, player: Color) -> bool {
    !all_legal_moves(board, player).is_empty()
}

/// Returns the winner if `player_to_move` has no legal move, else None.
pub fn check_winner(board: &crate::Board, player_to_move: Color) -> Option<Color> {
    if can_player_move(board, player_to_move) {
        None
    } else {
        Some(player_to_move.opponent())
    }
}

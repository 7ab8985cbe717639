// Depth-bounded minimax with alpha-beta pruning over complete turns.
// A "move" at the search-tree level is a full turn: the first hop plus
// every forced capture continuation behind it, branching over all legal
// continuations of the chain.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use draughts_core::{rules, Board, Color, Move, MoveOption, MoveOutcome, Square, BOARD_SIZE};
use once_cell::sync::Lazy;

use crate::evaluation::evaluate;

// Search parameters.
pub const TERMINAL_SCORE: i32 = 1_000_000; // side to move has no moves: lost
const ALPHA_INIT: i32 = -2_000_000;
const BETA_INIT: i32 = 2_000_000;
const TT_MAX_ENTRIES: usize = 500_000;     // clear the whole table past this
const WIN_PROBABILITY_SCALE: f64 = 300.0;  // logistic squashing constant

// Move ordering bonuses: captures first, long chains and promotions ahead
// of the rest, central destinations mildly preferred.
const ORDER_CAPTURE_BASE: i32 = 10_000;
const ORDER_CHAIN_WEIGHT: i32 = 1_000;
const ORDER_PROMOTION_BONUS: i32 = 500;
const ORDER_TT_MOVE_BONUS: i32 = 100_000;

/// Every playable square in a fixed scan order, for board serialization.
static DARK_SQUARES: Lazy<Vec<Square>> = Lazy::new(|| {
    let mut squares = Vec::with_capacity(50);
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            if let Some(sq) = Square::new(row, col) {
                if sq.is_dark() {
                    squares.push(sq);
                }
            }
        }
    }
    squares
});

// How reliable a cached score is, given the window it was searched with.
#[derive(Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Exact,
    LowerBound,
    UpperBound,
}

// Cached result of a previous search of the same position.
#[derive(Clone, Copy)]
struct TtEntry {
    depth: u8,
    score: i32,
    kind: EntryKind,
    best_first_hop: Option<Move>,
}

/// One candidate turn for the side to move: the first hop, the complete
/// hop sequence, and the board after the whole chain resolved.
#[derive(Debug, Clone)]
pub struct Turn {
    pub hops: Vec<Move>,
    pub board_after: Board,
    pub captures: u32,
    pub promotes: bool,
}

impl Turn {
    pub fn first_hop(&self) -> Move {
        self.hops[0]
    }

    /// "32-28", or "37x28x19" for a capture chain.
    pub fn notation(&self) -> String {
        let mut out = self
            .hops[0]
            .from
            .number()
            .map_or_else(|| "?".into(), |n| n.to_string());
        let sep = if self.hops[0].is_capture { 'x' } else { '-' };
        for hop in &self.hops {
            out.push(sep);
            out.push_str(&hop.to.number().map_or_else(|| "?".into(), |n| n.to_string()));
        }
        out
    }
}

/// A scored candidate move for analysis display, best first.
#[derive(Debug, Clone)]
pub struct RankedMove {
    pub mv: Move,
    pub notation: String,
    pub score: i32,
    pub win_probability: f64,
}

/// Per-call search state: the transposition table, the root color, and the
/// cooperative stop flag. Create one per top-level search; nothing here is
/// shared between calls or threads.
pub struct SearchSession {
    root_color: Color,
    tt: HashMap<String, TtEntry>,
    stop: Option<Arc<AtomicBool>>,
    nodes: u64,
}

impl SearchSession {
    pub fn new(root_color: Color) -> Self {
        Self { root_color, tt: HashMap::new(), stop: None, nodes: 0 }
    }

    /// A session that polls `stop` between root-level turn evaluations.
    /// When the flag is raised mid-depth, the partially searched depth is
    /// discarded and the best move of the last completed depth is kept.
    pub fn with_stop(root_color: Color, stop: Arc<AtomicBool>) -> Self {
        Self { root_color, tt: HashMap::new(), stop: Some(stop), nodes: 0 }
    }

    fn stopped(&self) -> bool {
        self.stop
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    /// The first hop of the best full-depth line, or None when the side to
    /// move has no legal moves (the caller has already lost; minimax is
    /// never entered in that case).
    pub fn choose_move(&mut self, board: &Board, depth: u8) -> Option<Move> {
        debug_assert_eq!(board.current_turn(), self.root_color);
        self.tt.clear();
        self.nodes = 0;

        let turns = enumerate_turns(board);
        if turns.is_empty() {
            return None;
        }

        let mut best: Option<(Move, i32)> = None;

        // Iterative deepening: each completed depth overwrites the result,
        // so an interrupted search still returns a fully searched move.
        for current_depth in 1..=depth.max(1) {
            let ordered = self.order_turns(turns.clone());
            let mut alpha = ALPHA_INIT;
            let mut depth_best: Option<(Move, i32)> = None;
            let mut aborted = false;

            for turn in &ordered {
                // Depth 1 always completes, so a stopped search still has
                // a fully searched move to return.
                if current_depth > 1 && self.stopped() {
                    aborted = true;
                    break;
                }
                let score =
                    self.minimax(&turn.board_after, current_depth - 1, alpha, BETA_INIT);
                if depth_best.map_or(true, |(_, s)| score > s) {
                    depth_best = Some((turn.first_hop(), score));
                }
                alpha = alpha.max(score);
            }

            if aborted {
                log::debug!("search stopped during depth {current_depth}, keeping previous result");
                break;
            }
            best = depth_best;
            log::debug!(
                "depth {current_depth}: best {:?} score {} ({} nodes)",
                best.map(|(mv, _)| mv.notation()),
                best.map_or(0, |(_, s)| s),
                self.nodes
            );
        }

        best.map(|(mv, _)| mv)
    }

    /// Scores every legal turn independently with a full window and returns
    /// them best first, for analysis display. Stop-flag aware: raising the
    /// flag returns the turns ranked so far.
    pub fn rank_moves(&mut self, board: &Board, depth: u8) -> Vec<RankedMove> {
        debug_assert_eq!(board.current_turn(), self.root_color);
        self.tt.clear();
        self.nodes = 0;

        let mut ranked = Vec::new();
        for turn in self.order_turns(enumerate_turns(board)) {
            // Always score at least one turn, stop flag or not.
            if !ranked.is_empty() && self.stopped() {
                break;
            }
            let score = self.minimax(
                &turn.board_after,
                depth.max(1) - 1,
                ALPHA_INIT,
                BETA_INIT,
            );
            ranked.push(RankedMove {
                mv: turn.first_hop(),
                notation: turn.notation(),
                score,
                win_probability: win_probability(score),
            });
        }
        ranked.sort_by_key(|entry| -entry.score);
        ranked
    }

    fn minimax(&mut self, board: &Board, depth: u8, alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;
        let side = board.current_turn();
        let maximizing = side == self.root_color;

        let turns = enumerate_turns(board);
        if turns.is_empty() {
            // No legal moves loses immediately for the side to move.
            return if maximizing { -TERMINAL_SCORE } else { TERMINAL_SCORE };
        }
        if depth == 0 {
            return evaluate(board, self.root_color);
        }

        let key = position_key(board);
        let mut alpha = alpha;
        let mut beta = beta;
        let mut tt_hop = None;

        if let Some(entry) = self.tt.get(&key) {
            // Shallower cached work is not trustworthy for this depth.
            if entry.depth >= depth {
                match entry.kind {
                    EntryKind::Exact => return entry.score,
                    EntryKind::LowerBound => alpha = alpha.max(entry.score),
                    EntryKind::UpperBound => beta = beta.min(entry.score),
                }
                if alpha >= beta {
                    return entry.score;
                }
            }
            tt_hop = entry.best_first_hop;
        }

        // Bound classification is relative to the window actually searched.
        let original_alpha = alpha;
        let original_beta = beta;

        let ordered = self.order_turns_with_hint(turns, tt_hop);
        let mut best_score = if maximizing { ALPHA_INIT } else { BETA_INIT };
        let mut best_hop = None;

        for turn in &ordered {
            let score = self.minimax(&turn.board_after, depth - 1, alpha, beta);
            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_hop = Some(turn.first_hop());
                }
                alpha = alpha.max(score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_hop = Some(turn.first_hop());
                }
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        let kind = if best_score <= original_alpha {
            EntryKind::UpperBound
        } else if best_score >= original_beta {
            EntryKind::LowerBound
        } else {
            EntryKind::Exact
        };
        if self.tt.len() >= TT_MAX_ENTRIES {
            // Arbitrary partial eviction approximates nothing; start over.
            log::trace!("transposition table full ({} entries), clearing", self.tt.len());
            self.tt.clear();
        }
        self.tt.insert(key, TtEntry { depth, score: best_score, kind, best_first_hop: best_hop });

        best_score
    }

    fn order_turns(&self, turns: Vec<Turn>) -> Vec<Turn> {
        self.order_turns_with_hint(turns, None)
    }

    fn order_turns_with_hint(&self, mut turns: Vec<Turn>, tt_hop: Option<Move>) -> Vec<Turn> {
        turns.sort_by_key(|turn| {
            let mut score = 0;
            if turn.captures > 0 {
                score += ORDER_CAPTURE_BASE + turn.captures as i32 * ORDER_CHAIN_WEIGHT;
            }
            if turn.promotes {
                score += ORDER_PROMOTION_BONUS;
            }
            let dest = turn.hops[turn.hops.len() - 1].to;
            let center_distance_x2 =
                (9 - 2 * dest.row as i32).abs() + (9 - 2 * dest.col as i32).abs();
            score += 9 - center_distance_x2 / 2;
            if tt_hop == Some(turn.first_hop()) {
                score += ORDER_TT_MOVE_BONUS;
            }
            -score
        });
        turns
    }
}

/// Expands every legal turn for the side to move on `board`, including all
/// branches of forced capture chains. Resuming a half-played chain (the
/// board has a locked chain piece) yields only that piece's continuations.
pub fn enumerate_turns(board: &Board) -> Vec<Turn> {
    let player = board.current_turn();
    let starts: Vec<(Square, Vec<MoveOption>)> = match board.chain_square() {
        Some(locked) => vec![(
            locked,
            rules::legal_moves(board, locked, player, board.pending_captures()),
        )],
        None => {
            let mut grouped: Vec<(Square, Vec<MoveOption>)> = Vec::new();
            for (from, option) in rules::all_legal_moves(board, player) {
                match grouped.last_mut() {
                    Some((sq, options)) if *sq == from => options.push(option),
                    _ => grouped.push((from, vec![option])),
                }
            }
            grouped
        }
    };

    let mut turns = Vec::new();
    for (from, options) in starts {
        for option in options {
            let mut hops = Vec::new();
            let mut child = board.clone();
            let mv = Move { from, to: option.to, is_capture: option.is_capture };
            extend_turn(&mut child, mv, &mut hops, &mut turns);
        }
    }
    turns
}

fn extend_turn(board: &mut Board, mv: Move, hops: &mut Vec<Move>, turns: &mut Vec<Turn>) {
    hops.push(mv);
    let had_kings_before = board
        .piece_at(mv.from)
        .map_or(false, |piece| piece.is_king());

    // The hop was produced by legal_moves, so apply_move cannot fail.
    match board.apply_move(mv) {
        Ok(MoveOutcome::ChainContinues { square }) => {
            let continuations =
                rules::legal_moves(board, square, board.current_turn(), board.pending_captures());
            for option in continuations {
                let mut branch_board = board.clone();
                let mut branch_hops = hops.clone();
                let next = Move { from: square, to: option.to, is_capture: option.is_capture };
                extend_turn(&mut branch_board, next, &mut branch_hops, turns);
            }
        }
        Ok(MoveOutcome::TurnComplete) | Ok(MoveOutcome::GameOver { .. }) => {
            let landing = hops[hops.len() - 1].to;
            let promotes = !had_kings_before
                && board.piece_at(landing).map_or(false, |piece| piece.is_king());
            turns.push(Turn {
                captures: hops.iter().filter(|hop| hop.is_capture).count() as u32,
                promotes,
                hops: hops.clone(),
                board_after: board.clone(),
            });
        }
        Err(err) => {
            debug_assert!(false, "generated hop rejected: {err}");
        }
    }
}

/// Canonical serialization of (board, side to move) for the transposition
/// table. Collision-free for distinct states: every dark square is visited
/// in a fixed order.
fn position_key(board: &Board) -> String {
    let mut key = String::with_capacity(64);
    for &sq in DARK_SQUARES.iter() {
        match board.piece_at(sq) {
            Some(piece) => key.push(piece.as_char()),
            None => key.push('.'),
        }
    }
    key.push(match board.current_turn() {
        Color::White => 'w',
        Color::Black => 'b',
    });
    key
}

/// Maps a centipawn-like score to a 0-100% winning chance for display.
pub fn win_probability(score: i32) -> f64 {
    100.0 / (1.0 + (-(score as f64) / WIN_PROBABILITY_SCALE).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_probability_is_monotonic_and_bounded() {
        assert!((win_probability(0) - 50.0).abs() < 1e-9);
        assert!(win_probability(300) > win_probability(100));
        assert!(win_probability(-300) < win_probability(-100));
        assert!(win_probability(TERMINAL_SCORE) <= 100.0);
        assert!(win_probability(-TERMINAL_SCORE) >= 0.0);
    }

    #[test]
    fn position_keys_distinguish_side_to_move() {
        let board = Board::new();
        let flipped = Board::from_pieces(
            Color::Black,
            &board.pieces().map(|(sq, p)| (sq, *p)).collect::<Vec<_>>(),
        );
        assert_ne!(position_key(&board), position_key(&flipped));
    }
}

//! Search behavior: pruning must not change results, the cache must never
//! serve shallower work, and forced wins must be found and played.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use draughts_core::{Board, Color, Piece, Square};
use draughts_engine::search::TERMINAL_SCORE;
use draughts_engine::{enumerate_turns, evaluate, SearchSession};

fn sq(row: u8, col: u8) -> Square {
    Square::new(row, col).unwrap()
}

/// Plain minimax without pruning or caching, as a reference oracle.
fn brute_force(board: &Board, root: Color, depth: u8) -> i32 {
    let maximizing = board.current_turn() == root;
    let turns = enumerate_turns(board);
    if turns.is_empty() {
        return if maximizing { -TERMINAL_SCORE } else { TERMINAL_SCORE };
    }
    if depth == 0 {
        return evaluate(board, root);
    }
    let scores = turns
        .iter()
        .map(|turn| brute_force(&turn.board_after, root, depth - 1));
    if maximizing {
        scores.max().unwrap()
    } else {
        scores.min().unwrap()
    }
}

fn midgame_board() -> Board {
    Board::from_pieces(
        Color::White,
        &[
            (sq(6, 3), Piece::man(Color::White)),
            (sq(6, 5), Piece::man(Color::White)),
            (sq(7, 2), Piece::man(Color::White)),
            (sq(3, 2), Piece::man(Color::Black)),
            (sq(3, 6), Piece::man(Color::Black)),
            (sq(2, 5), Piece::man(Color::Black)),
        ],
    )
}

#[test]
fn alpha_beta_matches_brute_force_minimax() {
    let boards = [
        midgame_board(),
        Board::from_pieces(
            Color::White,
            &[
                (sq(5, 4), Piece::king(Color::White)),
                (sq(2, 3), Piece::man(Color::Black)),
                (sq(1, 6), Piece::man(Color::Black)),
            ],
        ),
    ];

    for board in &boards {
        for depth in 1..=3 {
            let expected = brute_force(board, Color::White, depth);
            let mut session = SearchSession::new(Color::White);
            let ranked = session.rank_moves(board, depth);
            assert_eq!(
                ranked[0].score, expected,
                "pruning changed the root score at depth {depth}"
            );
        }
    }
}

#[test]
fn cached_shallow_results_never_leak_into_deeper_searches() {
    let board = midgame_board();

    // Prime the same session with a shallow search, then go deeper; the
    // result must match a fresh session that never saw shallow entries.
    let mut reused = SearchSession::new(Color::White);
    let _ = reused.choose_move(&board, 1);
    let deep_after_shallow = reused.choose_move(&board, 4);

    let mut fresh = SearchSession::new(Color::White);
    let deep_fresh = fresh.choose_move(&board, 4);

    assert_eq!(deep_after_shallow, deep_fresh);

    let mut ranked_reused = SearchSession::new(Color::White);
    let _ = ranked_reused.rank_moves(&board, 1);
    assert_eq!(
        ranked_reused.rank_moves(&board, 4)[0].score,
        brute_force(&board, Color::White, 4)
    );
}

#[test]
fn a_whole_forced_chain_is_one_search_move() {
    let board = Board::from_pieces(
        Color::White,
        &[
            (sq(9, 0), Piece::man(Color::White)),
            (sq(8, 1), Piece::man(Color::Black)),
            (sq(6, 1), Piece::man(Color::Black)),
        ],
    );
    let turns = enumerate_turns(&board);
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].hops.len(), 2);
    assert_eq!(turns[0].captures, 2);
    assert_eq!(turns[0].notation(), "46x37x26");
}

#[test]
fn finds_the_immediately_winning_chain() {
    let board = Board::from_pieces(
        Color::White,
        &[
            (sq(9, 0), Piece::man(Color::White)),
            (sq(8, 1), Piece::man(Color::Black)),
            (sq(6, 1), Piece::man(Color::Black)),
        ],
    );
    let mut session = SearchSession::new(Color::White);

    let ranked = session.rank_moves(&board, 3);
    assert_eq!(ranked[0].score, TERMINAL_SCORE);
    assert!(ranked[0].win_probability > 99.9);

    let mv = session.choose_move(&board, 3).unwrap();
    assert_eq!(mv.from, sq(9, 0));
    assert_eq!(mv.to, sq(7, 2));
    assert!(mv.is_capture);
}

#[test]
fn a_lost_position_yields_no_move() {
    // Black to move with no pieces at all.
    let board = Board::from_pieces(Color::Black, &[(sq(5, 4), Piece::man(Color::White))]);
    let mut session = SearchSession::new(Color::Black);
    assert_eq!(session.choose_move(&board, 3), None);
    assert!(session.rank_moves(&board, 3).is_empty());
}

#[test]
fn ranked_moves_are_sorted_best_first() {
    let board = Board::new();
    let mut session = SearchSession::new(Color::White);
    let ranked = session.rank_moves(&board, 3);

    assert!(!ranked.is_empty());
    for pair in ranked.windows(2) {
        assert!(pair[0].score >= pair[1].score);
        assert!(pair[0].win_probability >= pair[1].win_probability);
    }
}

#[test]
fn a_raised_stop_flag_still_returns_a_fully_searched_move() {
    let board = Board::new();
    let stop = Arc::new(AtomicBool::new(true));
    let mut session = SearchSession::with_stop(Color::White, Arc::clone(&stop));

    // Stopped before the search even starts: depth 1 still completes.
    let mv = session.choose_move(&board, 6).expect("depth 1 always completes");
    let mut probe = board.clone();
    assert!(probe.apply_move(mv).is_ok());

    stop.store(false, Ordering::Relaxed);
    let unhurried = session.choose_move(&board, 2);
    assert!(unhurried.is_some());
}

#[test]
fn forced_captures_dominate_the_root_move_list() {
    // White must play the capture; quiet moves never reach the search.
    let board = Board::from_pieces(
        Color::White,
        &[
            (sq(5, 4), Piece::man(Color::White)),
            (sq(8, 1), Piece::man(Color::White)),
            (sq(4, 3), Piece::man(Color::Black)),
            (sq(0, 1), Piece::man(Color::Black)),
        ],
    );
    let turns = enumerate_turns(&board);
    assert_eq!(turns.len(), 1);
    assert!(turns[0].first_hop().is_capture);
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use draughts_core::{Board, Move};
use rand::seq::SliceRandom;

use crate::search::SearchSession;

const MIN_DEPTH: u8 = 1;
const MAX_DEPTH: u8 = 8;
const DEFAULT_DEPTH: u8 = 5;

/// Computer opponent: a configured search depth plus a stop handle the
/// host can raise to bound thinking time. Stopping never yields a move
/// from a partially searched depth.
#[derive(Clone)]
pub struct DraughtsAi {
    depth: u8,
    stop: Arc<AtomicBool>,
}

impl DraughtsAi {
    pub fn new(depth: u8) -> Self {
        Self {
            depth: depth.clamp(MIN_DEPTH, MAX_DEPTH),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Raise from another thread to make the current search return early.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Picks a hop for the side to move, breaking ties between equally
    /// scored turns at random so repeated games do not replay themselves.
    /// Returns None when the side to move has already lost.
    pub fn get_move(&self, board: &Board) -> Option<Move> {
        self.stop.store(false, Ordering::Relaxed);
        let player = board.current_turn();
        let mut session = SearchSession::with_stop(player, self.stop_handle());

        let ranked = session.rank_moves(board, self.depth);
        let best_score = ranked.first()?.score;
        let candidates: Vec<Move> = ranked
            .iter()
            .take_while(|entry| entry.score == best_score)
            .map(|entry| entry.mv)
            .collect();
        let mv = *candidates.choose(&mut rand::thread_rng())?;

        // Probe the hop on a clone before handing it out.
        let mut probe = board.clone();
        if probe.apply_move(mv).is_err() {
            log::warn!("search produced an illegal hop {}", mv.notation());
            return None;
        }
        Some(mv)
    }
}

impl Default for DraughtsAi {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

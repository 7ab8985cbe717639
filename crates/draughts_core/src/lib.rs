// Core draughts game logic modules
pub mod board;
pub mod history;
pub mod moves;
pub mod piece;
pub mod position;
pub mod rules;

// Re-export main types for convenience
pub use board::Board;
pub use history::{MoveHistory, TurnRecord};
pub use moves::{Move, MoveError, MoveOption, MoveOutcome};
pub use piece::{Color, Piece, Rank};
pub use position::{Square, BOARD_SIZE};

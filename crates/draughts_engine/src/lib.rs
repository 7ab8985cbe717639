pub mod ai;
pub mod evaluation;
pub mod search;

pub use ai::DraughtsAi;
pub use evaluation::{evaluate, evaluate_hybrid};
pub use search::{enumerate_turns, win_probability, RankedMove, SearchSession, Turn};

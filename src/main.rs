//! Terminal driver for the draughts engine.
//!
//! - `draughts-engine selfplay` - AI vs AI game, printing the game record
//! - `draughts-engine analyze` - rank the legal turns of the start position

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use draughts_core::{Board, MoveHistory, MoveOutcome};
use draughts_engine::{DraughtsAi, SearchSession};

#[derive(Parser)]
#[command(name = "draughts-engine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a full AI vs AI game and print the record
    Selfplay {
        /// Search depth in plies (one ply = one side's full turn)
        #[arg(short, long, default_value_t = 4)]
        depth: u8,
        /// Abort the game after this many turns
        #[arg(long, default_value_t = 200)]
        max_turns: u32,
    },
    /// Rank the legal turns of the starting position
    Analyze {
        #[arg(short, long, default_value_t = 5)]
        depth: u8,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Selfplay { depth, max_turns }) => selfplay(depth, max_turns),
        Some(Commands::Analyze { depth }) => analyze(depth),
        None => analyze(5),
    }
}

fn selfplay(depth: u8, max_turns: u32) -> Result<()> {
    let ai = DraughtsAi::new(depth);
    let mut board = Board::new();
    let mut history = MoveHistory::new();

    for turn_number in 1..=max_turns {
        let snapshot = board.clone();
        let mut notation = String::new();

        // One full turn: keep feeding hops while the chain continues.
        loop {
            let Some(hop) = ai.get_move(&board) else {
                bail!("no move for the side to move, but no winner reported");
            };
            if notation.is_empty() {
                notation = hop.notation();
            } else if let Some(landing) = hop.to.number() {
                notation.push('x');
                notation.push_str(&landing.to_string());
            }
            match board.apply_move(hop) {
                Ok(MoveOutcome::ChainContinues { .. }) => continue,
                Ok(MoveOutcome::TurnComplete) => break,
                Ok(MoveOutcome::GameOver { winner }) => {
                    history.record(snapshot, notation);
                    print_record(&history);
                    println!("{board}");
                    println!("winner after {turn_number} turns: {winner:?}");
                    return Ok(());
                }
                Err(err) => bail!("engine produced an illegal hop: {err}"),
            }
        }
        history.record(snapshot, notation);
    }

    print_record(&history);
    println!("{board}");
    println!("no winner within {max_turns} turns");
    Ok(())
}

fn analyze(depth: u8) -> Result<()> {
    let board = Board::new();
    let mut session = SearchSession::new(board.current_turn());
    let ranked = session.rank_moves(&board, depth);

    println!("{board}");
    println!("{:<12} {:>8} {:>7}", "move", "score", "win%");
    for entry in ranked {
        println!(
            "{:<12} {:>8} {:>6.1}%",
            entry.notation, entry.score, entry.win_probability
        );
    }
    Ok(())
}

fn print_record(history: &MoveHistory) {
    for (index, notation) in history.notations().enumerate() {
        if index % 2 == 0 {
            print!("{}. {notation}", index / 2 + 1);
        } else {
            println!(" {notation}");
        }
    }
    if history.len() % 2 == 1 {
        println!();
    }
}

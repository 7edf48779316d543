//! Self-play games that record training examples.
//!
//! Each turn the engine searches, the root visit distribution is stored as the
//! policy target, and the next move is sampled from that distribution. Once
//! the game ends (or hits the move cap) every stored position is labeled with
//! the final outcome from the point of view of its side to move.

use tracing::{debug, info};

use crate::board::{Cell, Color};
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::mcts::SearchEngine;
use crate::position::{Move, Outcome, Position};

/// One searched position with its targets.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub position: Position,
    /// Root visit distribution, indexed by [`Move::index`].
    pub policy: Vec<f32>,
    /// Final outcome for the side to move: `1.0` win, `-1.0` loss, `0.0` otherwise.
    pub value: f32,
}

impl TrainingExample {
    /// Cell bytes in row-major order, one per on-board point.
    pub fn cells(&self) -> Vec<u8> {
        self.position.board().cells().map(Cell::byte).collect()
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }
}

/// A finished self-play game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub moves: Vec<Move>,
    pub examples: Vec<TrainingExample>,
    pub outcome: Outcome,
}

/// Play from the engine's current root until the game is decided, no move can
/// be committed, or `max_moves` moves have been played.
pub fn play_game<E: Evaluator>(engine: &mut SearchEngine<E>, max_moves: u32) -> Result<GameRecord> {
    let mut moves = Vec::new();
    let mut pending: Vec<(Position, Vec<f32>)> = Vec::new();

    while (moves.len() as u32) < max_moves && !engine.position().is_terminal() {
        engine.search()?;
        let policy = engine.root_policy();
        if policy.iter().all(|&p| p == 0.0) {
            debug!(ply = moves.len(), "no visited root move, stopping");
            break;
        }
        pending.push((engine.position().clone(), policy));

        let mv = engine.commit_sampled_move()?;
        debug!(ply = moves.len() + 1, mv = %mv, "self-play move");
        moves.push(mv);
    }

    let outcome = engine.position().result();
    let examples = pending
        .into_iter()
        .map(|(position, policy)| TrainingExample {
            value: outcome.value_for(position.side_to_move()) as f32,
            position,
            policy,
        })
        .collect::<Vec<_>>();
    info!(moves = moves.len(), examples = examples.len(), outcome = ?outcome, "self-play game finished");

    Ok(GameRecord {
        moves,
        examples,
        outcome,
    })
}

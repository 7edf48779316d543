//! Evaluator trait for leaf evaluation.
//!
//! The search asks an evaluator for a value estimate of each leaf it reaches.
//! The default [`RolloutEvaluator`] plays a random game to the end (or to its
//! ply bound). A learned policy/value model can be plugged in by implementing
//! [`Evaluator`]; the policy it returns is reported alongside the value but
//! plain UCT selection does not use priors.

use thiserror::Error;
use tracing::trace;

use crate::config::SearchConfig;
use crate::playout::rollout;
use crate::position::{Move, Position};

/// Errors that can occur during evaluation.
#[derive(Debug, Error, PartialEq)]
pub enum EvaluatorError {
    #[error("evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("invalid position: {0}")]
    InvalidPosition(String),
}

/// Result of evaluating a position.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Move probabilities over the side to move's legal moves. May be empty.
    pub policy: Vec<(Move, f32)>,

    /// Value estimate for the side to move.
    /// Range: -1.0 (certain loss) to +1.0 (certain win).
    pub value: f64,
}

pub trait Evaluator {
    fn evaluate(&mut self, position: &Position) -> Result<Evaluation, EvaluatorError>;
}

/// Random rollout evaluator: the value is the outcome of one uniform random
/// playout, `0.0` if it was truncated.
#[derive(Debug, Clone)]
pub struct RolloutEvaluator {
    /// Maximum rollout length in plies
    pub max_plies: u32,
    rng: fastrand::Rng,
}

impl Default for RolloutEvaluator {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl RolloutEvaluator {
    pub fn new(max_plies: u32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self { max_plies, rng }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.rollout_plies, config.seed)
    }
}

impl Evaluator for RolloutEvaluator {
    fn evaluate(&mut self, position: &Position) -> Result<Evaluation, EvaluatorError> {
        let report = rollout(position, self.max_plies, &mut self.rng);
        trace!(plies = report.plies, outcome = ?report.outcome, "rollout finished");
        Ok(Evaluation {
            policy: Vec::new(),
            value: report.outcome.value_for(position.side_to_move()),
        })
    }
}

/// Uniform policy over legal moves, terminal-only value. Useful for testing the
/// search without any rollout noise.
#[derive(Debug, Clone, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&mut self, position: &Position) -> Result<Evaluation, EvaluatorError> {
        let side = position.side_to_move();
        let value = position.result().value_for(side);
        if position.is_terminal() {
            return Ok(Evaluation {
                policy: Vec::new(),
                value,
            });
        }

        let moves = position.legal_moves(side);
        let prob = if moves.is_empty() {
            0.0
        } else {
            1.0 / moves.len() as f32
        };
        Ok(Evaluation {
            policy: moves.into_iter().map(|mv| (mv, prob)).collect(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Color;

    #[test]
    fn test_uniform_evaluator_start() {
        let mut eval = UniformEvaluator::new();
        let result = eval.evaluate(&Position::start()).unwrap();

        assert_eq!(result.policy.len(), 44);
        let total: f32 = result.policy.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-4);
        assert!(result.value.abs() < 1e-9);
    }

    #[test]
    fn test_uniform_evaluator_terminal() {
        let mut eval = UniformEvaluator::new();
        let pos = Position::from_fen("4K4/9/9/9/9/9/9/9/4R4/4k4 r")
            .unwrap()
            .apply_move((8, 4), (9, 4));
        assert_eq!(pos.side_to_move(), Color::Black);

        let result = eval.evaluate(&pos).unwrap();
        assert!(result.policy.is_empty());
        assert!((result.value - (-1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_rollout_evaluator_is_reproducible_with_seed() {
        let pos = Position::start();
        let mut a = RolloutEvaluator::new(30, Some(42));
        let mut b = RolloutEvaluator::new(30, Some(42));
        for _ in 0..5 {
            assert_eq!(a.evaluate(&pos).unwrap(), b.evaluate(&pos).unwrap());
        }
    }

    #[test]
    fn test_rollout_evaluator_value_in_range() {
        let pos = Position::start();
        let mut eval = RolloutEvaluator::new(20, Some(1));
        for _ in 0..5 {
            let value = eval.evaluate(&pos).unwrap().value;
            assert!((-1.0..=1.0).contains(&value));
        }
    }
}

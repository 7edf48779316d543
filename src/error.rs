//! Error types shared by the rules engine and the search.

use thiserror::Error;

use crate::board::Point;
use crate::evaluator::EvaluatorError;

/// Errors surfaced by position construction, move commitment, and search.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// The supplied move is not among the legal moves of the side to move.
    #[error("illegal move: {from:?} -> {to:?}")]
    IllegalMove { from: Point, to: Point },

    /// The board failed validation (dimensions, notation, or general count).
    #[error("invalid board: {0}")]
    InvalidBoard(String),

    /// No move can be committed from the current root.
    #[error("no legal move available")]
    NoLegalMove,

    #[error("evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("invalid search configuration: {0}")]
    Config(String),

    /// Text input (move or square notation) could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

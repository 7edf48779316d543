//! Xiangqi-MCTS: a Chinese chess rules engine with a Monte Carlo Tree Search
//! planner.
//!
//! The game is simplified: a side loses when its general is captured. There is
//! no check, flying-general or repetition rule.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry and engine defaults
//! - [`board`] - Grid, pieces and placement notation
//! - [`rules`] - Per-piece movement rules
//! - [`position`] - Positions, moves and successor generation
//! - [`playout`] - Random game simulation for leaf evaluation
//! - [`evaluator`] - Pluggable leaf evaluation
//! - [`tree`] - Arena-allocated search tree
//! - [`config`] - Search parameters
//! - [`mcts`] - The search engine
//! - [`selfplay`] - Self-play games recording policy and value targets
//! - [`protocol`] - Line-oriented text front end
//!
//! ## Example
//!
//! ```
//! use xiangqi_mcts::config::SearchConfig;
//! use xiangqi_mcts::mcts::SearchEngine;
//! use xiangqi_mcts::position::Position;
//!
//! let config = SearchConfig::default().with_rounds(50).with_rollout_plies(20).with_seed(1);
//! let mut engine = SearchEngine::new(Position::start(), config).unwrap();
//!
//! engine.search().unwrap();
//! let mv = engine.commit_best_move().unwrap();
//! println!("Black plays {mv}");
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod error;
pub mod evaluator;
pub mod mcts;
pub mod playout;
pub mod position;
pub mod protocol;
pub mod rules;
pub mod selfplay;
pub mod tree;

pub use board::{Board, Color, Piece, PieceKind, Point};
pub use config::SearchConfig;
pub use error::{EngineError, Result};
pub use mcts::SearchEngine;
pub use position::{Move, Outcome, Position};

//! Search configuration parameters.

use crate::constants::{DEFAULT_ROLLOUT_PLIES, DEFAULT_ROUNDS, EXPLORATION};
use crate::error::{EngineError, Result};

/// Configuration for the tree search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Rounds (select, expand, evaluate, backpropagate) per `search()` call.
    pub rounds: u32,

    /// UCT exploration constant `C` in `mean + C * sqrt(2 ln N / n)`.
    pub exploration: f64,

    /// Ply bound for each random rollout.
    pub rollout_plies: u32,

    /// Seed for the rollout and move-sampling RNGs. `None` seeds from the
    /// environment.
    pub seed: Option<u64>,

    /// Visit-count temperature for sampled moves. `0.0` always takes the most
    /// visited child; `1.0` samples in proportion to visits.
    pub temperature: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            exploration: EXPLORATION,
            rollout_plies: DEFAULT_ROLLOUT_PLIES,
            seed: None,
            temperature: 1.0,
        }
    }
}

impl SearchConfig {
    /// Small, seeded configuration for tests.
    pub fn for_testing() -> Self {
        Self {
            rounds: 64,
            exploration: EXPLORATION,
            rollout_plies: 40,
            seed: Some(42),
            temperature: 1.0,
        }
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    pub fn with_rollout_plies(mut self, plies: u32) -> Self {
        self.rollout_plies = plies;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_temperature(mut self, t: f32) -> Self {
        self.temperature = t;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(EngineError::Config("rounds must be at least 1".to_string()));
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(EngineError::Config(format!(
                "exploration must be finite and non-negative, got {}",
                self.exploration
            )));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(EngineError::Config(format!(
                "temperature must be finite and non-negative, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

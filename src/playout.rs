//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays uniformly random legal moves until one side has lost its
//! general, the side to move has no move at all, or the ply bound is reached.
//! Positions already visited during the same playout are avoided when an
//! unvisited successor exists; this keeps playouts from shuffling between two
//! positions, but it is not a repetition rule and a playout may still run out
//! its ply bound.

use rustc_hash::FxHashSet;

use crate::position::{Outcome, Position};

/// What a single playout ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloutReport {
    /// `Undecided` when the playout was truncated or the mover had no move.
    pub outcome: Outcome,
    /// Plies actually played.
    pub plies: u32,
}

/// Perform a random playout from `start`.
pub fn rollout(start: &Position, max_plies: u32, rng: &mut fastrand::Rng) -> RolloutReport {
    let mut current = start.clone();
    let mut seen: FxHashSet<Position> = FxHashSet::default();
    seen.insert(current.clone());
    let mut plies = 0;

    while !current.is_terminal() && plies < max_plies {
        let successors = current.successors(current.side_to_move());
        if successors.is_empty() {
            break;
        }

        let fresh: Vec<&Position> = successors
            .iter()
            .map(|(pos, _)| pos)
            .filter(|pos| !seen.contains(*pos))
            .collect();
        let next = if fresh.is_empty() {
            &successors[rng.usize(..successors.len())].0
        } else {
            fresh[rng.usize(..fresh.len())]
        };

        current = next.clone();
        seen.insert(current.clone());
        plies += 1;
    }

    RolloutReport {
        outcome: current.result(),
        plies,
    }
}

//! Monte Carlo Tree Search over game positions.
//!
//! Each round of [`SearchEngine::search`] runs four phases:
//!
//! 1. **Select**: descend from the root, always taking the child with the best
//!    UCT score, until reaching a node with no children.
//! 2. **Expand**: if that node was already evaluated once (and the game is not
//!    over there), add one child per legal move and step into the best of them.
//!    Fresh children score +inf, so the first one is taken.
//! 3. **Evaluate**: terminal nodes score their result; anything else goes to
//!    the [`Evaluator`] (a random rollout by default).
//! 4. **Backpropagate**: credit the value to every node on the path, flipping
//!    sign per ply (see [`crate::tree`] for the convention).
//!
//! After a search the caller commits a move: the engine's best
//! ([`SearchEngine::commit_best_move`]), one sampled from the visit counts
//! ([`SearchEngine::commit_sampled_move`]), or one supplied from outside
//! ([`SearchEngine::commit_external_move`]). The chosen child becomes the new
//! root and the rest of the tree is dropped.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::board::Point;
use crate::config::SearchConfig;
use crate::constants::REPORT_PERIOD;
use crate::error::{EngineError, Result};
use crate::evaluator::{Evaluator, RolloutEvaluator};
use crate::position::{Move, Position};
use crate::tree::{NodeId, SearchTree, TreeStats};

/// Summary of one `search()` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSummary {
    /// Rounds performed by this call.
    pub rounds: u32,
    /// Total root visits, including earlier searches on the same subtree.
    pub root_visits: u32,
    /// Mean value for the side to move at the root.
    pub root_value: f64,
    pub tree_nodes: usize,
    pub max_depth: u32,
}

/// Statistics for one root child, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildStats {
    pub mv: Move,
    pub visits: u32,
    /// Mean value for the side to move at the root.
    pub mean: f64,
}

/// Owns the search tree and runs the search on it.
pub struct SearchEngine<E: Evaluator = RolloutEvaluator> {
    tree: SearchTree,
    evaluator: E,
    config: SearchConfig,
    /// Move sampling only; rollouts use the evaluator's own RNG.
    rng: fastrand::Rng,
}

impl SearchEngine<RolloutEvaluator> {
    /// Create an engine that evaluates leaves with random rollouts.
    pub fn new(position: Position, config: SearchConfig) -> Result<Self> {
        let evaluator = RolloutEvaluator::from_config(&config);
        Self::with_evaluator(position, config, evaluator)
    }
}

impl<E: Evaluator> SearchEngine<E> {
    /// Fails with [`EngineError::InvalidBoard`] unless each side has exactly
    /// one general.
    pub fn with_evaluator(position: Position, config: SearchConfig, evaluator: E) -> Result<Self> {
        config.validate()?;
        position.validate()?;
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed.wrapping_add(1)),
            None => fastrand::Rng::new(),
        };
        Ok(Self {
            tree: SearchTree::new(position),
            evaluator,
            config,
            rng,
        })
    }

    /// The position at the root of the tree.
    pub fn position(&self) -> &Position {
        &self.tree.root_node().position
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_rounds(&mut self, rounds: u32) -> Result<()> {
        let config = self.config.clone().with_rounds(rounds);
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Discard the tree and start over from `position`.
    pub fn reset(&mut self, position: Position) -> Result<()> {
        position.validate()?;
        self.tree = SearchTree::new(position);
        Ok(())
    }

    /// Run `config.rounds` search rounds from the current root.
    pub fn search(&mut self) -> Result<SearchSummary> {
        let rounds = self.config.rounds;
        for round in 1..=rounds {
            self.run_round()?;
            if round % REPORT_PERIOD == 0 {
                trace!(
                    round,
                    root_visits = self.tree.root_node().visits,
                    nodes = self.tree.len(),
                    "search progress"
                );
            }
        }

        let stats: TreeStats = self.tree.stats();
        debug!(
            rounds,
            root_visits = stats.root_visits,
            root_value = stats.root_value,
            nodes = stats.total_nodes,
            depth = stats.max_depth,
            "search complete"
        );
        Ok(SearchSummary {
            rounds,
            root_visits: stats.root_visits,
            root_value: stats.root_value,
            tree_nodes: stats.total_nodes,
            max_depth: stats.max_depth,
        })
    }

    /// One select / expand / evaluate / backpropagate round.
    fn run_round(&mut self) -> Result<()> {
        let mut leaf = self.select();

        let node = self.tree.get(leaf);
        if node.visits >= 1 && !node.is_terminal() {
            self.expand(leaf);
            if let Some(child) = self.tree.select_child(leaf, self.config.exploration) {
                leaf = child;
            }
        }

        let value = self.evaluate(leaf)?;
        self.tree.backpropagate(leaf, value);
        Ok(())
    }

    fn select(&self) -> NodeId {
        let mut current = self.tree.root();
        while self.tree.get(current).is_expanded() {
            match self.tree.select_child(current, self.config.exploration) {
                Some(child) => current = child,
                None => break,
            }
        }
        current
    }

    fn expand(&mut self, id: NodeId) {
        let position = self.tree.get(id).position.clone();
        for (next, mv) in position.successors(position.side_to_move()) {
            self.tree.add_child(id, mv, next);
        }
    }

    /// Value of the node's position for its side to move.
    fn evaluate(&mut self, id: NodeId) -> Result<f64> {
        let position = &self.tree.get(id).position;
        if position.is_terminal() {
            return Ok(position.result().value_for(position.side_to_move()));
        }
        let evaluation = self.evaluator.evaluate(position)?;
        Ok(evaluation.value.clamp(-1.0, 1.0))
    }

    /// The root child with the best mean value, ignoring unvisited children.
    /// `None` when nothing can be committed.
    pub fn best_move(&self) -> Option<Move> {
        self.best_child().map(|(mv, _)| mv)
    }

    fn best_child(&self) -> Option<(Move, NodeId)> {
        let root = self.tree.root_node();
        let opponent = root.position.side_to_move().opponent();
        if root.is_terminal() || !root.position.has_general(opponent) {
            return None;
        }

        let mut best: Option<(Move, NodeId, f64)> = None;
        for &(mv, child) in &root.children {
            let node = self.tree.get(child);
            if node.visits == 0 {
                continue;
            }
            let mean = node.mean_value();
            if best.is_none_or(|(_, _, top)| mean > top) {
                best = Some((mv, child, mean));
            }
        }
        best.map(|(mv, id, _)| (mv, id))
    }

    /// Play the best move found so far and re-root the tree under it.
    ///
    /// Fails with [`EngineError::NoLegalMove`] when the root has no visited
    /// children, or the game at the root is already decided.
    ///
    /// A root whose opponent has already lost its general counts as decided:
    /// every child would be a board without that general.
    pub fn commit_best_move(&mut self) -> Result<Move> {
        let (mv, child) = self.best_child().ok_or(EngineError::NoLegalMove)?;
        let node = self.tree.get(child);
        debug!(
            mv = %mv,
            visits = node.visits,
            mean = node.mean_value(),
            "committing best move"
        );
        self.tree.reroot(child);
        Ok(mv)
    }

    /// Visit distribution over root moves, indexed by [`Move::index`], at the
    /// configured temperature.
    pub fn root_policy(&self) -> Vec<f32> {
        self.tree.root_policy(self.config.temperature)
    }

    /// Sample a root move from [`SearchEngine::root_policy`], play it and
    /// re-root. Fails like [`SearchEngine::commit_best_move`].
    pub fn commit_sampled_move(&mut self) -> Result<Move> {
        if self.best_child().is_none() {
            return Err(EngineError::NoLegalMove);
        }
        let policy = self.root_policy();
        let mv = sample_index(&policy, &mut self.rng)
            .and_then(Move::from_index)
            .ok_or(EngineError::NoLegalMove)?;
        let child = self
            .tree
            .child_by_move(self.tree.root(), mv)
            .ok_or(EngineError::NoLegalMove)?;
        debug!(
            mv = %mv,
            visits = self.tree.get(child).visits,
            probability = policy[mv.index()],
            "committing sampled move"
        );
        self.tree.reroot(child);
        Ok(mv)
    }

    /// Legal destinations from `from` for the side to move at the root.
    /// Empty once the game is decided.
    pub fn legal_moves_from(&self, from: Point) -> BTreeSet<Point> {
        let position = self.position();
        if position.is_terminal() {
            return BTreeSet::new();
        }
        position.legal_moves_from(from, position.side_to_move())
    }

    /// Play a move supplied from outside (e.g. a human) and re-root.
    ///
    /// The existing subtree is kept when the move was already expanded;
    /// otherwise the search restarts from the resulting position.
    pub fn commit_external_move(&mut self, from: Point, to: Point) -> Result<()> {
        if !self.legal_moves_from(from).contains(&to) {
            return Err(EngineError::IllegalMove { from, to });
        }

        let next = self.position().apply_move(from, to);
        match self.tree.child_by_position(self.tree.root(), &next) {
            Some(child) => {
                debug!(mv = %Move::new(from, to), visits = self.tree.get(child).visits, "reusing subtree");
                self.tree.reroot(child);
            }
            None => {
                debug!(mv = %Move::new(from, to), "no matching child, starting fresh tree");
                self.tree = SearchTree::new(next);
                self.tree.get_mut(self.tree.root()).mv = Some(Move::new(from, to));
            }
        }
        Ok(())
    }

    /// Root children ordered by visit count, most visited first.
    pub fn root_children(&self) -> Vec<ChildStats> {
        let mut stats: Vec<ChildStats> = self
            .tree
            .root_node()
            .children
            .iter()
            .map(|&(mv, id)| {
                let node = self.tree.get(id);
                ChildStats {
                    mv,
                    visits: node.visits,
                    mean: node.mean_value(),
                }
            })
            .collect();
        stats.sort_by(|a, b| b.visits.cmp(&a.visits));
        stats
    }
}

/// Draw an index with probability proportional to `policy`.
fn sample_index(policy: &[f32], rng: &mut fastrand::Rng) -> Option<usize> {
    let r = rng.f32();
    let mut cumsum = 0.0;
    for (i, &p) in policy.iter().enumerate() {
        cumsum += p;
        if p > 0.0 && r < cumsum {
            return Some(i);
        }
    }

    // Rounding can leave the total just under r.
    policy.iter().rposition(|&p| p > 0.0)
}

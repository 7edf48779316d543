//! Search tree with arena allocation.
//!
//! Nodes live in a contiguous `Vec` and refer to each other by [`NodeId`]. A
//! node owns its children through its `children` list; the `parent` field is a
//! plain index used only to walk back up during backpropagation.
//!
//! Value convention: a node's `value_sum` is accumulated from the point of view
//! of the player who made the move leading to it, i.e. the opponent of the
//! node's side to move. A parent therefore prefers the child with the highest
//! mean, and backpropagation negates the value at every ply.

use crate::board::Color;
use crate::constants::MOVE_INDEX_SPACE;
use crate::position::{Move, Position};

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub position: Position,

    /// Parent index (NONE for the root)
    pub parent: NodeId,

    /// Move that led here from the parent (None for a fresh root)
    pub mv: Option<Move>,

    /// Empty until the node is expanded.
    pub children: Vec<(Move, NodeId)>,

    pub visits: u32,

    /// Sum of backpropagated values, from the perspective of [`Node::mover`].
    pub value_sum: f64,
}

impl Node {
    pub fn new_root(position: Position) -> Self {
        Self {
            position,
            parent: NodeId::NONE,
            mv: None,
            children: Vec::new(),
            visits: 0,
            value_sum: 0.0,
        }
    }

    pub fn new_child(parent: NodeId, mv: Move, position: Position) -> Self {
        Self {
            parent,
            mv: Some(mv),
            ..Self::new_root(position)
        }
    }

    /// The player whose move produced this node.
    #[inline]
    pub fn mover(&self) -> Color {
        self.position.side_to_move().opponent()
    }

    /// Mean value for [`Node::mover`]. Returns 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f64
        }
    }

    /// UCT score: `mean + c * sqrt(2 ln(N_parent) / n)`.
    ///
    /// Unvisited children, and children of an unvisited parent, score +inf so
    /// they are always tried first.
    #[inline]
    pub fn uct_score(&self, parent_visits: u32, c: f64) -> f64 {
        if self.visits == 0 || parent_visits == 0 {
            return f64::INFINITY;
        }
        let n = self.visits as f64;
        self.mean_value() + c * (2.0 * (parent_visits as f64).ln() / n).sqrt()
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.position.is_terminal()
    }
}

/// Search tree with arena-based node storage.
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SearchTree {
    pub fn new(position: Position) -> Self {
        Self {
            nodes: vec![Node::new_root(position)],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn root_node(&self) -> &Node {
        self.get(self.root)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Attach a new child under `parent` and return its id.
    pub fn add_child(&mut self, parent: NodeId, mv: Move, position: Position) -> NodeId {
        let child = self.allocate(Node::new_child(parent, mv, position));
        self.get_mut(parent).children.push((mv, child));
        child
    }

    /// The child with the highest UCT score. Ties go to the earliest child.
    pub fn select_child(&self, id: NodeId, c: f64) -> Option<NodeId> {
        let node = self.get(id);
        let mut best: Option<(NodeId, f64)> = None;
        for &(_, child) in &node.children {
            let score = self.get(child).uct_score(node.visits, c);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((child, score));
            }
        }
        best.map(|(child, _)| child)
    }

    /// Add one visit along the path from `leaf` to the root.
    ///
    /// `value` is from the perspective of the side to move at `leaf`; each node
    /// is credited from its own mover's perspective, flipping sign per ply.
    pub fn backpropagate(&mut self, leaf: NodeId, value: f64) {
        let mut current = leaf;
        let mut credit = -value;

        while current.is_some() {
            let node = self.get_mut(current);
            node.visits += 1;
            node.value_sum += credit;
            credit = -credit;
            current = node.parent;
        }
    }

    pub fn child_by_move(&self, id: NodeId, mv: Move) -> Option<NodeId> {
        self.get(id)
            .children
            .iter()
            .find(|(m, _)| *m == mv)
            .map(|&(_, child)| child)
    }

    pub fn child_by_position(&self, id: NodeId, position: &Position) -> Option<NodeId> {
        self.get(id)
            .children
            .iter()
            .map(|&(_, child)| child)
            .find(|&child| self.get(child).position == *position)
    }

    /// Make `new_root` the root, discarding everything outside its subtree.
    ///
    /// The arena is compacted: surviving nodes are renumbered breadth-first
    /// with the new root at index 0, so ids held from before are invalid.
    pub fn reroot(&mut self, new_root: NodeId) {
        let mut order = vec![new_root];
        let mut head = 0;
        while head < order.len() {
            let id = order[head];
            order.extend(self.get(id).children.iter().map(|&(_, child)| child));
            head += 1;
        }

        let mut remap = vec![NodeId::NONE; self.nodes.len()];
        for (new, &old) in order.iter().enumerate() {
            remap[old.index()] = NodeId(new as u32);
        }

        let mut old_nodes: Vec<Option<Node>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        self.nodes = order
            .iter()
            .filter_map(|&old| old_nodes[old.index()].take())
            .map(|mut node| {
                node.parent = if node.parent.is_some() {
                    remap[node.parent.index()]
                } else {
                    NodeId::NONE
                };
                for (_, child) in &mut node.children {
                    *child = remap[child.index()];
                }
                node
            })
            .collect();
        self.root = NodeId(0);
    }

    /// Root child visit distribution over the dense move index space.
    ///
    /// Visits are raised to `1 / temperature` before normalizing. A temperature
    /// near zero puts all mass on the most visited child (first one on ties).
    /// All zeros when no root child has been visited.
    pub fn root_policy(&self, temperature: f32) -> Vec<f32> {
        let root = self.root_node();
        let mut policy = vec![0.0; MOVE_INDEX_SPACE];

        if temperature < 1e-6 {
            let mut best: Option<(Move, u32)> = None;
            for &(mv, child) in &root.children {
                let visits = self.get(child).visits;
                if visits > 0 && best.is_none_or(|(_, top)| visits > top) {
                    best = Some((mv, visits));
                }
            }
            if let Some((mv, _)) = best {
                policy[mv.index()] = 1.0;
            }
            return policy;
        }

        let weights: Vec<(Move, f32)> = root
            .children
            .iter()
            .map(|&(mv, child)| {
                let v = self.get(child).visits as f32;
                let w = if temperature == 1.0 { v } else { v.powf(1.0 / temperature) };
                (mv, w)
            })
            .collect();
        let total: f32 = weights.iter().map(|(_, w)| w).sum();
        if total > 0.0 {
            for (mv, w) in weights {
                policy[mv.index()] = w / total;
            }
        }
        policy
    }

    pub fn stats(&self) -> TreeStats {
        let root = self.root_node();
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visits,
            root_value: -root.mean_value(),
            max_depth: self.max_depth(),
        }
    }

    fn max_depth(&self) -> u32 {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0u32)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(self.get(id).children.iter().map(|&(_, c)| (c, depth + 1)));
        }
        deepest
    }
}

/// Statistics about a search tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    /// Mean value for the side to move at the root.
    pub root_value: f64,
    pub max_depth: u32,
}

//! Per-piece movement rules.
//!
//! Every piece kind maps to a [`PieceRule`]: a candidate generator producing raw
//! signed destinations, and an optional custom filter. [`legal_destinations`]
//! runs candidates through the same three stages for every kind:
//!
//! 1. bounds: the destination must be on the board
//! 2. occupancy: the destination must not hold a piece of the mover's color
//! 3. the kind's custom filter (line of sight, screen, hobbled leg, zones)
//!
//! The rule table is a plain `static`, indexed by [`PieceKind`]. Both colors
//! share one rule; color only changes direction and which zone applies.

use std::collections::BTreeSet;

use crate::board::{Board, Color, PieceKind, Point};
use crate::constants::{
    BLACK_HALF_MIN, BLACK_PALACE_ROW_MIN, COLS, PALACE_COL_MAX, PALACE_COL_MIN, RED_HALF_MAX,
    RED_PALACE_ROW_MAX, ROWS,
};

/// Raw candidate generator. Offsets may fall off the board.
pub type Candidates = fn(&Board, Point, Color) -> Vec<(isize, isize)>;

/// Kind-specific check applied after the bounds and occupancy stages.
pub type CustomFilter = fn(&Board, Point, Color, Point) -> bool;

pub struct PieceRule {
    pub candidates: Candidates,
    pub filter: Option<CustomFilter>,
}

static RULES: [PieceRule; 7] = [
    // Soldier
    PieceRule {
        candidates: soldier_candidates,
        filter: None,
    },
    // Chariot
    PieceRule {
        candidates: orthogonal_rays,
        filter: Some(chariot_filter),
    },
    // Cannon
    PieceRule {
        candidates: orthogonal_rays,
        filter: Some(cannon_filter),
    },
    // Horse
    PieceRule {
        candidates: horse_candidates,
        filter: Some(horse_filter),
    },
    // Elephant
    PieceRule {
        candidates: elephant_candidates,
        filter: Some(elephant_filter),
    },
    // Advisor
    PieceRule {
        candidates: advisor_candidates,
        filter: Some(palace_filter),
    },
    // General
    PieceRule {
        candidates: general_candidates,
        filter: Some(palace_filter),
    },
];

const ORTHOGONAL: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const HORSE_JUMPS: [(isize, isize); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// Look up the rule for a piece kind.
#[inline]
pub fn rule(kind: PieceKind) -> &'static PieceRule {
    &RULES[kind as usize - 1]
}

/// Legal destinations for the piece at `from`. Empty for an empty cell.
pub fn legal_destinations(board: &Board, from: Point) -> BTreeSet<Point> {
    let Some(piece) = board.get(from) else {
        return BTreeSet::new();
    };
    let rule = rule(piece.kind);

    (rule.candidates)(board, from, piece.color)
        .into_iter()
        .filter(|&(row, col)| board.contains(row, col))
        .map(|(row, col)| (row as usize, col as usize))
        .filter(|&to| board.get(to).is_none_or(|target| target.color != piece.color))
        .filter(|&to| rule.filter.is_none_or(|custom| custom(board, from, piece.color, to)))
        .collect()
}

// =============================================================================
// Zones
// =============================================================================

/// Whether `row` lies in `color`'s own half.
#[inline]
pub fn in_own_half(color: Color, row: usize) -> bool {
    match color {
        Color::Red => row <= RED_HALF_MAX,
        Color::Black => row >= BLACK_HALF_MIN,
    }
}

/// Whether a soldier of `color` standing on `row` has crossed the river.
#[inline]
pub fn has_crossed_river(color: Color, row: usize) -> bool {
    !in_own_half(color, row)
}

/// Whether `pt` lies in `color`'s palace.
#[inline]
pub fn in_palace(color: Color, (row, col): Point) -> bool {
    let rows_ok = match color {
        Color::Red => row <= RED_PALACE_ROW_MAX,
        Color::Black => row >= BLACK_PALACE_ROW_MIN,
    };
    rows_ok && (PALACE_COL_MIN..=PALACE_COL_MAX).contains(&col)
}

/// Number of occupied cells strictly between two points on the same row or
/// column. `None` when the points do not share a line.
pub fn pieces_between(board: &Board, from: Point, to: Point) -> Option<usize> {
    let (fr, fc) = from;
    let (tr, tc) = to;
    if fr == tr {
        let (lo, hi) = (fc.min(tc), fc.max(tc));
        Some((lo + 1..hi).filter(|&c| !board.is_empty_at((fr, c))).count())
    } else if fc == tc {
        let (lo, hi) = (fr.min(tr), fr.max(tr));
        Some((lo + 1..hi).filter(|&r| !board.is_empty_at((r, fc))).count())
    } else {
        None
    }
}

#[inline]
fn shifted((row, col): Point, (dr, dc): (isize, isize)) -> (isize, isize) {
    (row as isize + dr, col as isize + dc)
}

// =============================================================================
// Candidate generators
// =============================================================================

fn soldier_candidates(_board: &Board, from: Point, color: Color) -> Vec<(isize, isize)> {
    let mut moves = vec![shifted(from, (color.forward(), 0))];
    if has_crossed_river(color, from.0) {
        moves.push(shifted(from, (0, 1)));
        moves.push(shifted(from, (0, -1)));
    }
    moves
}

/// Every cell along the four orthogonal rays, regardless of occupancy.
fn orthogonal_rays(_board: &Board, from: Point, _color: Color) -> Vec<(isize, isize)> {
    let reach = ROWS.max(COLS) as isize;
    ORTHOGONAL
        .iter()
        .flat_map(|&(dr, dc)| (1..reach).map(move |i| shifted(from, (dr * i, dc * i))))
        .collect()
}

fn horse_candidates(_board: &Board, from: Point, _color: Color) -> Vec<(isize, isize)> {
    HORSE_JUMPS.iter().map(|&d| shifted(from, d)).collect()
}

fn elephant_candidates(_board: &Board, from: Point, _color: Color) -> Vec<(isize, isize)> {
    DIAGONAL
        .iter()
        .map(|&(dr, dc)| shifted(from, (2 * dr, 2 * dc)))
        .collect()
}

fn advisor_candidates(_board: &Board, from: Point, _color: Color) -> Vec<(isize, isize)> {
    DIAGONAL.iter().map(|&d| shifted(from, d)).collect()
}

fn general_candidates(_board: &Board, from: Point, _color: Color) -> Vec<(isize, isize)> {
    ORTHOGONAL.iter().map(|&d| shifted(from, d)).collect()
}

// =============================================================================
// Custom filters
// =============================================================================

/// Clear line of sight; the occupancy stage already rejected own pieces.
fn chariot_filter(board: &Board, from: Point, _color: Color, to: Point) -> bool {
    pieces_between(board, from, to) == Some(0)
}

/// Quiet moves need a clear line; captures need exactly one screen.
fn cannon_filter(board: &Board, from: Point, _color: Color, to: Point) -> bool {
    match (pieces_between(board, from, to), board.is_empty_at(to)) {
        (Some(0), true) => true,
        (Some(1), false) => true,
        _ => false,
    }
}

/// The leg is the orthogonal neighbor of `from` along the jump's long axis.
fn horse_filter(board: &Board, from: Point, _color: Color, to: Point) -> bool {
    board.is_empty_at(horse_leg(from, to))
}

/// Elephant eye must be empty and the destination must stay in the own half.
fn elephant_filter(board: &Board, from: Point, color: Color, to: Point) -> bool {
    let eye = ((from.0 + to.0) / 2, (from.1 + to.1) / 2);
    board.is_empty_at(eye) && in_own_half(color, to.0)
}

fn palace_filter(_board: &Board, _from: Point, color: Color, to: Point) -> bool {
    in_palace(color, to)
}

/// The cell that hobbles a horse jumping from `from` to `to`.
pub fn horse_leg(from: Point, to: Point) -> Point {
    let dr = to.0 as isize - from.0 as isize;
    let dc = to.1 as isize - from.1 as isize;
    if dr.abs() == 2 {
        ((from.0 as isize + dr / 2) as usize, from.1)
    } else {
        (from.0, (from.1 as isize + dc / 2) as usize)
    }
}

//! Game positions, moves, and successor generation.
//!
//! A [`Position`] is a board plus the side to move. Positions are values: every
//! transition returns a new position and never mutates the original. Two
//! positions are equal when their placements and sides to move match, which is
//! what transposition checks in rollouts rely on.
//!
//! Successors are enumerated row-major over the mover's pieces, then in
//! ascending destination order, so enumeration is reproducible.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::board::{Board, Color, Piece, PieceKind, Point};
use crate::constants::{COLS, MOVE_INDEX_SPACE, ROWS};
use crate::error::{EngineError, Result};
use crate::rules::legal_destinations;

/// A move: relocate the piece on `from` to `to`, capturing whatever is there.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub from: Point,
    pub to: Point,
}

impl Move {
    pub const fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    /// Dense index in `[0, 8100)`, used to address evaluator policy vectors.
    pub fn index(self) -> usize {
        let (fr, fc) = self.from;
        let (tr, tc) = self.to;
        fr * COLS * ROWS * COLS + fc * ROWS * COLS + tr * COLS + tc
    }

    /// Inverse of [`Move::index`].
    pub fn from_index(index: usize) -> Option<Move> {
        if index >= MOVE_INDEX_SPACE {
            return None;
        }
        let fr = index / (COLS * ROWS * COLS);
        let fc = (index % (COLS * ROWS * COLS)) / (ROWS * COLS);
        let tr = (index % (ROWS * COLS)) / COLS;
        let tc = index % COLS;
        Some(Move::new((fr, fc), (tr, tc)))
    }
}

/// Parse a square such as `e9` (file letter, then row digit) into a Point.
pub fn parse_square(s: &str) -> Result<Point> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return Err(EngineError::Parse(format!("bad square '{s}'")));
    }
    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];
    if !(b'a'..b'a' + COLS as u8).contains(&file) || !rank.is_ascii_digit() {
        return Err(EngineError::Parse(format!("bad square '{s}'")));
    }
    Ok(((rank - b'0') as usize, (file - b'a') as usize))
}

/// Format a Point as a square string, e.g. `(9, 4)` -> `e9`.
pub fn str_square((row, col): Point) -> String {
    format!("{}{row}", (b'a' + col as u8) as char)
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", str_square(self.from), str_square(self.to))
    }
}

impl FromStr for Move {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != 4 || !s.is_ascii() {
            return Err(EngineError::Parse(format!("bad move '{s}'")));
        }
        Ok(Move::new(parse_square(&s[..2])?, parse_square(&s[2..])?))
    }
}

/// Game outcome from a fixed, color-based perspective.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win(Color),
    /// Game not decided (still running, or a rollout was truncated).
    Undecided,
}

impl Outcome {
    /// `+1` if `color` won, `-1` if it lost, `0` otherwise.
    pub fn value_for(self, color: Color) -> f64 {
        match self {
            Outcome::Win(winner) if winner == color => 1.0,
            Outcome::Win(_) => -1.0,
            Outcome::Undecided => 0.0,
        }
    }
}

/// Board plus side to move.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    board: Board,
    side_to_move: Color,
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl Position {
    /// Create a position, requiring exactly one general per side.
    pub fn new(board: Board, side_to_move: Color) -> Result<Self> {
        let position = Self::unchecked(board, side_to_move);
        position.validate()?;
        Ok(position)
    }

    /// Check that each side has exactly one general.
    pub fn validate(&self) -> Result<()> {
        for color in [Color::Red, Color::Black] {
            let generals = self.board.count(Piece::new(color, PieceKind::General));
            if generals != 1 {
                return Err(EngineError::InvalidBoard(format!(
                    "{color} has {generals} generals, expected 1"
                )));
            }
        }
        Ok(())
    }

    /// Create a position without validating the general count. Intended for
    /// rule queries on partial or miniature boards.
    pub fn unchecked(board: Board, side_to_move: Color) -> Self {
        Self {
            board,
            side_to_move,
        }
    }

    /// The standard opening. Black moves first.
    pub fn start() -> Self {
        Self::unchecked(Board::standard(), Color::Black)
    }

    /// Parse `"<placement> <r|b>"`. The side defaults to Black when omitted.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut parts = fen.split_whitespace();
        let placement = parts
            .next()
            .ok_or_else(|| EngineError::InvalidBoard("empty position string".to_string()))?;
        let side = match parts.next() {
            None | Some("b") => Color::Black,
            Some("r") | Some("w") => Color::Red,
            Some(other) => {
                return Err(EngineError::InvalidBoard(format!(
                    "unknown side to move '{other}'"
                )));
            }
        };
        Self::new(Board::from_fen(placement)?, side)
    }

    pub fn to_fen(&self) -> String {
        let side = match self.side_to_move {
            Color::Red => 'r',
            Color::Black => 'b',
        };
        format!("{} {side}", self.board.to_fen())
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Whether `color` still has its general on the board.
    pub fn has_general(&self, color: Color) -> bool {
        self.board
            .pieces(color)
            .any(|(_, piece)| piece.kind == PieceKind::General)
    }

    /// The side to move has lost its general.
    pub fn is_terminal(&self) -> bool {
        !self.has_general(self.side_to_move)
    }

    pub fn result(&self) -> Outcome {
        if self.is_terminal() {
            Outcome::Win(self.side_to_move.opponent())
        } else {
            Outcome::Undecided
        }
    }

    /// Relocate the piece on `from` to `to` and pass the turn. No legality
    /// check is performed; validate with [`Position::legal_moves_from`] first.
    pub fn apply_move(&self, from: Point, to: Point) -> Position {
        let mut board = self.board.clone();
        let piece = board.get(from);
        board.set(to, piece);
        board.set(from, None);
        Position {
            board,
            side_to_move: self.side_to_move.opponent(),
        }
    }

    /// Every legal successor for `color`, paired with the move producing it.
    ///
    /// Each `(from, to)` pair appears at most once.
    pub fn successors(&self, color: Color) -> Vec<(Position, Move)> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for (from, _) in self.board.pieces(color) {
            for to in legal_destinations(&self.board, from) {
                let mv = Move::new(from, to);
                if seen.insert(mv) {
                    out.push((self.apply_move(from, to), mv));
                }
            }
        }
        out
    }

    /// Legal moves for `color` without building successor positions.
    pub fn legal_moves(&self, color: Color) -> Vec<Move> {
        self.board
            .pieces(color)
            .flat_map(|(from, _)| {
                legal_destinations(&self.board, from)
                    .into_iter()
                    .map(move |to| Move::new(from, to))
            })
            .collect()
    }

    /// Destinations reachable from `from` by a piece of `color`. Empty when the
    /// cell is empty or holds the other color.
    pub fn legal_moves_from(&self, from: Point, color: Color) -> BTreeSet<Point> {
        match self.board.get(from) {
            Some(piece) if piece.color == color => legal_destinations(&self.board, from),
            _ => BTreeSet::new(),
        }
    }

    /// A uniformly sampled successor for `color`, or `None` if it has no move.
    pub fn random_successor(&self, color: Color, rng: &mut fastrand::Rng) -> Option<Position> {
        let moves = self.legal_moves(color);
        if moves.is_empty() {
            return None;
        }
        let mv = moves[rng.usize(..moves.len())];
        Some(self.apply_move(mv.from, mv.to))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)?;
        writeln!(f, "to move: {}", self.side_to_move)
    }
}
